//! Optional append-only transcript logging, toggled with `/log` or `-l`.

use std::fs::OpenOptions;
use std::io::Write;

pub struct LoggingState {
    file_path: Option<String>,
    is_active: bool,
}

impl LoggingState {
    pub fn new(log_file: Option<String>) -> Self {
        let is_active = log_file.is_some();
        LoggingState {
            file_path: log_file,
            is_active,
        }
    }

    pub fn set_log_file(&mut self, path: String) -> Result<String, Box<dyn std::error::Error>> {
        // Test if we can create/write to the file before committing to it.
        OpenOptions::new().create(true).append(true).open(&path)?;

        self.file_path = Some(path.clone());
        self.is_active = true;
        Ok(format!("Logging enabled to: {path}"))
    }

    pub fn toggle_logging(&mut self) -> Result<String, Box<dyn std::error::Error>> {
        match &self.file_path {
            Some(path) => {
                self.is_active = !self.is_active;
                if self.is_active {
                    Ok(format!("Logging resumed to: {path}"))
                } else {
                    Ok(format!("Logging paused (file: {path})"))
                }
            }
            None => {
                Err("No log file specified. Use /log <filename> to enable logging first.".into())
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active && self.file_path.is_some()
    }

    pub fn log_message(&self, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        if !self.is_active() {
            return Ok(());
        }
        let file_path = self.file_path.as_ref().ok_or("no log file configured")?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        for line in content.lines() {
            writeln!(file, "{line}")?;
        }
        // Blank line between messages, matching the on-screen spacing.
        writeln!(file)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_logging_writes_nothing() {
        let logging = LoggingState::new(None);
        assert!(!logging.is_active());
        assert!(logging.log_message("ignored").is_ok());
    }

    #[test]
    fn messages_append_to_the_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.log");
        let logging = LoggingState::new(Some(path.to_string_lossy().into_owned()));

        logging.log_message("Bonjour").unwrap();
        logging.log_message("Salut").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "Bonjour\n\nSalut\n\n");
    }

    #[test]
    fn toggling_without_a_file_is_an_error() {
        let mut logging = LoggingState::new(None);
        assert!(logging.toggle_logging().is_err());
    }

    #[test]
    fn toggle_pauses_and_resumes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.log");
        let mut logging = LoggingState::new(Some(path.to_string_lossy().into_owned()));
        assert!(logging.is_active());

        logging.toggle_logging().unwrap();
        assert!(!logging.is_active());
        logging.toggle_logging().unwrap();
        assert!(logging.is_active());
    }
}
