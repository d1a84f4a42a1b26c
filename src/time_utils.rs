use chrono::{DateTime, Utc};

/// Retourne le timestamp courant en UTC
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Formate un timestamp ISO 8601 pour SQLite
pub fn to_sqlite(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Parse un timestamp ISO 8601 depuis SQLite
pub fn from_sqlite(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    s.parse::<DateTime<Utc>>()
}

/// Heure courte pour la trace d'une session (HH:MM:SS).
pub fn clock(dt: &DateTime<Utc>) -> String {
    dt.format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_roundtrip() {
        let dt = now();
        let s = to_sqlite(&dt);
        let parsed = from_sqlite(&s).unwrap();
        assert_eq!(dt.timestamp(), parsed.timestamp());
    }

    #[test]
    fn test_clock_format() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 3).unwrap();
        assert_eq!(clock(&dt), "07:05:03");
    }
}
