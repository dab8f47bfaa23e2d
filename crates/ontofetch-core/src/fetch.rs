//! HTTP fetch of one source document.
//!
//! Uses the curl crate (libcurl) for a plain blocking GET: follows
//! redirects, optionally sends an `Accept:` header for sources that
//! content-negotiate, and streams the body to a destination file. Any
//! non-2xx status is a hard failure; there is no retry.

use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const FETCH_TIMEOUT: Duration = Duration::from_secs(300);
const MAX_REDIRECTIONS: u32 = 10;

/// Error from fetching a single source (curl failure, HTTP error, or a
/// failed write to the destination file).
#[derive(Debug)]
pub enum FetchError {
    /// Curl reported an error (DNS, timeout, refused connection, etc.).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http { url: String, code: u32 },
    /// Writing the body to the destination file failed.
    Io(io::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Curl(e) => write!(f, "{}", e),
            FetchError::Http { url, code } => write!(f, "GET {} returned HTTP {}", url, code),
            FetchError::Io(e) => write!(f, "write failed: {}", e),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Curl(e) => Some(e),
            FetchError::Io(e) => Some(e),
            FetchError::Http { .. } => None,
        }
    }
}

/// Seam for the download step so the refresh loop can be tested without a
/// network: production code uses [`CurlFetcher`], tests substitute a fake.
pub trait Fetcher {
    /// Fetch `url` into `dest`, returning the number of bytes written.
    fn fetch(&self, url: &str, accept: Option<&str>, dest: &Path) -> Result<u64, FetchError>;
}

/// Fetcher backed by libcurl.
#[derive(Debug, Default)]
pub struct CurlFetcher;

impl Fetcher for CurlFetcher {
    fn fetch(&self, url: &str, accept: Option<&str>, dest: &Path) -> Result<u64, FetchError> {
        let mut file = File::create(dest).map_err(FetchError::Io)?;

        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(FetchError::Curl)?;
        easy.follow_location(true).map_err(FetchError::Curl)?;
        easy.max_redirections(MAX_REDIRECTIONS)
            .map_err(FetchError::Curl)?;
        easy.connect_timeout(CONNECT_TIMEOUT)
            .map_err(FetchError::Curl)?;
        easy.timeout(FETCH_TIMEOUT).map_err(FetchError::Curl)?;

        if let Some(accept) = accept {
            let mut list = curl::easy::List::new();
            list.append(&format!("Accept: {}", accept.trim()))
                .map_err(FetchError::Curl)?;
            easy.http_headers(list).map_err(FetchError::Curl)?;
        }

        let mut written: u64 = 0;
        let mut write_err: Option<io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| match file.write_all(data) {
                    Ok(()) => {
                        written += data.len() as u64;
                        Ok(data.len())
                    }
                    Err(e) => {
                        write_err = Some(e);
                        Ok(0) // abort transfer
                    }
                })
                .map_err(FetchError::Curl)?;
            transfer.perform()
        };

        // A write failure also surfaces as a curl "write error"; report the
        // underlying io error instead.
        if let Some(e) = write_err {
            return Err(FetchError::Io(e));
        }
        performed.map_err(FetchError::Curl)?;

        let code = easy.response_code().map_err(FetchError::Curl)?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http {
                url: url.to_string(),
                code,
            });
        }

        tracing::debug!(url, bytes = written, "fetched source");
        Ok(written)
    }
}
