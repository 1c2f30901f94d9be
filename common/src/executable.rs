/// Platform file name for an executable stem (`player` becomes `player.exe` on Windows).
///
/// Process image names reported by the OS carry the same suffix, so this is also the
/// name used when terminating a process by image name.
pub fn executable_file_name(stem: &str) -> String {
    if cfg!(windows) && !stem.to_ascii_lowercase().ends_with(".exe") {
        format!("{stem}.exe")
    } else {
        stem.to_string()
    }
}
