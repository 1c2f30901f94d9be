mod error;
mod headless;
mod launcher;
