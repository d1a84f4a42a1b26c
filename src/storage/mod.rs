pub mod attempts;
pub mod database;
pub mod knowledge;
pub mod migrations;
pub mod path_utils;
