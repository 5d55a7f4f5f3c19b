pub mod asr;
pub mod audio;
pub mod batch;
pub mod catalog;
pub mod config;
pub mod notes;
pub mod processor;
pub mod retry;
pub mod storage;
pub mod utils;

use std::env;
use once_cell::sync::Lazy;

const MINUTES_STATE_PATH: &str = "./minutes_data/processed_items.json";
const MINUTES_WORK_DIR: &str = "./minutes_data/work/";

pub static STATE_PATH: Lazy<String> = Lazy::new(|| {
    match env::var("MINUTES_STATE_PATH") {
        Ok(path) => path,
        Err(_) => {
            dotenv::var("MINUTES_STATE_PATH").unwrap_or_else(|_| MINUTES_STATE_PATH.to_string())
        }
    }
});

pub static WORK_DIR: Lazy<String> = Lazy::new(|| {
    match env::var("MINUTES_WORK_DIR") {
        Ok(path) => path,
        Err(_) => {
            dotenv::var("MINUTES_WORK_DIR").unwrap_or_else(|_| MINUTES_WORK_DIR.to_string())
        }
    }
});

pub fn init_env() {
    dotenv::dotenv().ok();

    // make sure the data directories exist before anything opens them
    if let Some(dir) = std::path::Path::new(STATE_PATH.as_str()).parent() {
        std::fs::create_dir_all(dir).unwrap_or_else(|e| {
            eprintln!("Failed to create state directory: {}", e);
        });
    }
    std::fs::create_dir_all(WORK_DIR.as_str()).unwrap_or_else(|e| {
        eprintln!("Failed to create work directory: {}", e);
    });
}
