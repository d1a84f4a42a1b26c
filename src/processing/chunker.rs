//! Recursive character splitter for reference documents.
//!
//! Splits on the coarsest separator present (`"\n\n"`, `"\n"`, `" "`, then
//! single characters), merges the pieces back into chunks of at most
//! `chunk_size` characters and carries up to `overlap` characters of trailing
//! context into the next chunk.

const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split `text` into overlapping chunks. Empty or whitespace-only input yields no chunks.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chunk_size = chunk_size.max(1);
    let overlap = overlap.min(chunk_size.saturating_sub(1));
    split_recursive(text, SEPARATORS, chunk_size, overlap)
}

fn split_recursive(text: &str, separators: &[&str], chunk_size: usize, overlap: usize) -> Vec<String> {
    let (idx, separator) = separators
        .iter()
        .enumerate()
        .find(|(_, sep)| sep.is_empty() || text.contains(**sep))
        .map(|(i, sep)| (i, *sep))
        .unwrap_or((separators.len(), ""));
    let remaining = separators.get(idx + 1..).unwrap_or(&[]);

    let splits: Vec<String> = if separator.is_empty() {
        text.chars().map(String::from).collect()
    } else {
        text.split(separator)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    };

    let mut chunks = Vec::new();
    let mut good: Vec<String> = Vec::new();

    for piece in splits {
        if char_len(&piece) < chunk_size {
            good.push(piece);
            continue;
        }
        if !good.is_empty() {
            chunks.extend(merge_splits(&good, separator, chunk_size, overlap));
            good.clear();
        }
        if remaining.is_empty() {
            chunks.push(piece);
        } else {
            chunks.extend(split_recursive(&piece, remaining, chunk_size, overlap));
        }
    }

    if !good.is_empty() {
        chunks.extend(merge_splits(&good, separator, chunk_size, overlap));
    }

    chunks
}

fn merge_splits(splits: &[String], separator: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let sep_len = char_len(separator);
    let mut docs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut total = 0usize;

    for split in splits {
        let len = char_len(split);
        let joined_len = |current: &Vec<&str>, total: usize| {
            total + len + if current.is_empty() { 0 } else { sep_len }
        };

        if joined_len(&current, total) > chunk_size && !current.is_empty() {
            push_doc(&mut docs, &current, separator);
            // Drop from the front until the carried context fits the overlap budget
            while !current.is_empty()
                && (total > overlap || (joined_len(&current, total) > chunk_size && total > 0))
            {
                let head = char_len(current[0]) + if current.len() > 1 { sep_len } else { 0 };
                total = total.saturating_sub(head);
                current.remove(0);
            }
        }

        total += len + if current.is_empty() { 0 } else { sep_len };
        current.push(split);
    }

    push_doc(&mut docs, &current, separator);
    docs
}

fn push_doc(docs: &mut Vec<String>, parts: &[&str], separator: &str) {
    let doc = parts.join(separator);
    let doc = doc.trim();
    if !doc.is_empty() {
        docs.push(doc.to_string());
    }
}
