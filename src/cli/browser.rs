//! Opening exercise links in the system browser

use std::process::Command;

use url::Url;

use crate::error::{EduQuestError, Result};

/// Parse a link and accept only web addresses
pub fn validate_link(link: &str) -> Result<Url> {
    let url = Url::parse(link.trim())
        .map_err(|e| EduQuestError::InvalidInput(format!("Invalid link '{}': {}", link, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(EduQuestError::InvalidInput(format!(
            "Refusing to open '{}' link: only http and https are supported",
            scheme
        ))),
    }
}

/// Open a link in the default browser.
///
/// Returns true if the browser was successfully launched.
pub fn open_link(link: &str) -> Result<bool> {
    let url = validate_link(link)?;
    let launched = open_browser(url.as_str());
    tracing::debug!(url = %url, launched, "opening link");
    Ok(launched)
}

#[allow(unused_variables)]
fn open_browser(url: &str) -> bool {
    #[cfg(target_os = "macos")]
    {
        Command::new("open").arg(url).spawn().is_ok()
    }
    #[cfg(target_os = "linux")]
    {
        Command::new("xdg-open").arg(url).spawn().is_ok()
    }
    #[cfg(target_os = "windows")]
    {
        Command::new("cmd")
            .args(["/C", "start", "", url])
            .spawn()
            .is_ok()
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_link_accepts_web_urls() {
        assert!(validate_link("https://pt.khanacademy.org/math").is_ok());
        assert!(validate_link(" http://example.com ").is_ok());
    }

    #[test]
    fn test_validate_link_rejects_other_schemes() {
        assert!(validate_link("file:///etc/passwd").is_err());
        assert!(validate_link("javascript:alert(1)").is_err());
        assert!(validate_link("not a link").is_err());
    }
}
