pub mod file_picker;
