//! Access key CSV reader
//!
//! Reads the credentials file downloaded from the IAM console when an
//! access key is created. The file has a header row naming the columns and
//! one data row; newer downloads start with a UTF-8 byte order mark.

use crate::error::{Error, Result};
use std::path::Path;

/// Header of the access key id column
pub const ACCESS_KEY_COLUMN: &str = "Access key ID";

/// Header of the secret access key column
pub const SECRET_KEY_COLUMN: &str = "Secret access key";

/// An AWS access key pair
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKey {
    pub key: String,
    pub secret: String,
}

impl std::fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessKey")
            .field("key", &self.key)
            .field("secret", &"****")
            .finish()
    }
}

/// Read an access key pair from a credentials CSV file
pub fn read_credentials_csv(path: impl AsRef<Path>) -> Result<AccessKey> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_credentials_csv(&content)
}

/// Parse an access key pair from credentials CSV content
pub fn parse_credentials_csv(content: &str) -> Result<AccessKey> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.lines().filter(|l| !l.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| Error::config("Credentials file is empty"))?;
    let headers = split_record(header);

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::config(format!("Credentials file has no '{name}' column")))
    };
    let key_idx = column(ACCESS_KEY_COLUMN)?;
    let secret_idx = column(SECRET_KEY_COLUMN)?;

    let row = lines
        .next()
        .ok_or_else(|| Error::config("Credentials file has no data row"))?;
    let fields = split_record(row);

    let field = |idx: usize, name: &str| {
        fields
            .get(idx)
            .filter(|v| !v.is_empty())
            .cloned()
            .ok_or_else(|| Error::config(format!("Credentials file has an empty '{name}'")))
    };

    Ok(AccessKey {
        key: field(key_idx, ACCESS_KEY_COLUMN)?,
        secret: field(secret_idx, SECRET_KEY_COLUMN)?,
    })
}

/// Fields of one comma-separated record
///
/// Quoted fields may hold commas; `""` inside quotes is a literal quote.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field).trim().to_string()),
            _ => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_access_key_download() {
        let csv = "Access key ID,Secret access key\nAAAA,aaaa\n";
        let creds = parse_credentials_csv(csv).unwrap();
        assert_eq!(creds.key, "AAAA");
        assert_eq!(creds.secret, "aaaa");
    }

    #[test]
    fn test_parse_console_user_download_with_bom() {
        let csv = "\u{feff}User name,Password,Access key ID,Secret access key,Console login link\n\
                   admin,,ABCD,EFGH,https://example.signin.aws.amazon.com/console\n";
        let creds = parse_credentials_csv(csv).unwrap();
        assert_eq!(creds.key, "ABCD");
        assert_eq!(creds.secret, "EFGH");
    }

    #[test]
    fn test_parse_quoted_fields() {
        let csv = "\"Access key ID\",\"Secret access key\"\n\"AK\",\"s/ec,ret\"\n";
        let creds = parse_credentials_csv(csv).unwrap();
        assert_eq!(creds.secret, "s/ec,ret");
    }

    #[test]
    fn test_missing_column() {
        let err = parse_credentials_csv("User name,Password\nadmin,pw\n").unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains(ACCESS_KEY_COLUMN));
    }

    #[test]
    fn test_missing_data_row() {
        let err = parse_credentials_csv("Access key ID,Secret access key\n").unwrap_err();
        assert!(err.to_string().contains("no data row"));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_credentials_csv("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_debug_masks_secret() {
        let creds = AccessKey {
            key: "AK".to_string(),
            secret: "hunter2".to_string(),
        };
        assert!(!format!("{creds:?}").contains("hunter2"));
    }

    #[test]
    fn test_split_record() {
        assert_eq!(
            split_record(r#"a, "b,c" ,"say ""hi""",,"#),
            vec!["a", "b,c", r#"say "hi""#, "", ""]
        );
        assert_eq!(split_record(""), vec![""]);
    }
}
