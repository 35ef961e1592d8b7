//! Outbound email.
//!
//! The request layer only composes messages; delivery belongs to an
//! external relay. [`Mailer`] is the seam: production spools messages
//! as files for the relay to pick up, tests substitute a recording
//! implementation.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use log::info;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub subject: String,
    pub body: String,
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
}

pub trait Mailer: Send + Sync {
    fn send(&self, email: &OutgoingEmail) -> Result<(), String>;
}

/// Writes each message as an RFC-822-style file into the spool
/// directory. The directory is created on first use.
pub struct SpoolMailer {
    spool_dir: PathBuf,
}

impl SpoolMailer {
    pub fn new(spool_dir: impl Into<PathBuf>) -> Self {
        SpoolMailer {
            spool_dir: spool_dir.into(),
        }
    }
}

impl Mailer for SpoolMailer {
    fn send(&self, email: &OutgoingEmail) -> Result<(), String> {
        fs::create_dir_all(&self.spool_dir).map_err(|e| e.to_string())?;
        let path = self
            .spool_dir
            .join(format!("{}.eml", Uuid::new_v4().simple()));
        let mut file = fs::File::create(&path).map_err(|e| e.to_string())?;
        write!(file, "From: {}\r\nTo: {}\r\n", email.from, email.to).map_err(|e| e.to_string())?;
        if let Some(reply_to) = &email.reply_to {
            write!(file, "Reply-To: {}\r\n", reply_to).map_err(|e| e.to_string())?;
        }
        write!(file, "Subject: {}\r\n\r\n{}", email.subject, email.body)
            .map_err(|e| e.to_string())?;
        info!("spooled outgoing email to {}", path.display());
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spool_mailer_writes_headers_and_body() {
        let dir = tempfile::TempDir::new().unwrap();
        let mailer = SpoolMailer::new(dir.path());
        mailer
            .send(&OutgoingEmail {
                subject: "Hi".to_string(),
                body: "Body text".to_string(),
                from: "a@example.com".to_string(),
                to: "b@example.com".to_string(),
                reply_to: Some("Ana <ana@example.com>".to_string()),
            })
            .unwrap();

        let entry = fs::read_dir(dir.path()).unwrap().next().unwrap().unwrap();
        let content = fs::read_to_string(entry.path()).unwrap();
        assert!(content.contains("From: a@example.com"));
        assert!(content.contains("Reply-To: Ana <ana@example.com>"));
        assert!(content.contains("Subject: Hi"));
        assert!(content.ends_with("Body text"));
    }
}
