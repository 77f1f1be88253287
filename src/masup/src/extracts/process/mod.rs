pub mod extract_process_data;
pub mod process_manager;
