//! Static file serving and download decoration.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use log::{debug, warn};

use crate::app::error::Error;
use crate::app::handler::{Context, Outcome};
use crate::app::response::Body;

/// Options for [`Context::serve_static`].
#[derive(Debug, Clone)]
pub struct StaticOptions {
    /// Media type to send; guessed from the file extension when `None`.
    pub media_type: Option<String>,
    pub charset: Option<String>,
}

impl Default for StaticOptions {
    fn default() -> Self {
        Self {
            media_type: None,
            charset: Some("UTF-8".to_string()),
        }
    }
}

/// Options for [`Context::download`].
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Filename offered to the client.
    pub filename: Option<String>,
    /// Media type to send; guessed from the filename when `None`.
    pub media_type: Option<String>,
    pub charset: Option<String>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            filename: None,
            media_type: None,
            charset: Some("UTF-8".to_string()),
        }
    }
}

impl DownloadOptions {
    pub fn with_filename(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            ..Self::default()
        }
    }
}

/// Resolve `requested` below `root` without touching the filesystem.
///
/// Returns `None` when the path climbs out of `root`.
fn map_path(root: &Path, requested: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for comp in Path::new(requested.trim_start_matches(['/', '\\'])).components() {
        match comp {
            Component::Normal(s) => relative.push(s),
            Component::CurDir => {}
            Component::ParentDir => {
                if !relative.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(root.join(relative))
}

fn basename(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}

/// Quote a `Content-Disposition` filename, escaping `"` and `\`.
fn quote_filename(filename: &str) -> String {
    let mut quoted = String::with_capacity(filename.len() + 2);
    quoted.push('"');
    for c in filename.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Guess a media type from a file name's extension.
pub fn guess_media_type(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match extension.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "xml" => "application/xml",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/vnd.microsoft.icon",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "wasm" => "application/wasm",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

impl Context {
    /// Serve the file at `path` below the document root `root`.
    ///
    /// Yields the file's bytes, `Status(403)` if `path` escapes `root`
    /// either lexically or through a symlink,
    /// or `Status(404)` if no regular file exists there. The requested
    /// file name is remembered for a following [`Context::download`]
    /// even when the file is not served.
    pub fn serve_static(
        &mut self,
        root: impl AsRef<Path>,
        path: &str,
        options: &StaticOptions,
    ) -> Result<Outcome, Error> {
        let root = root.as_ref();
        let Some(resolved) = map_path(root, path) else {
            self.response.last_served_filename = basename(Path::new(path));
            warn!("Refusing static path {path:?} outside {}", root.display());
            return Ok(Outcome::Status(403));
        };
        self.response.last_served_filename = basename(&resolved);

        // Symlinks may still point outside the root.
        let real = match fs::canonicalize(&resolved) {
            Ok(real) => real,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Outcome::Status(404)),
            Err(e) => return Err(Error::Io(e)),
        };
        if !real.starts_with(fs::canonicalize(root)?) {
            warn!(
                "Refusing static path {path:?} resolving to {} outside {}",
                real.display(),
                root.display()
            );
            return Ok(Outcome::Status(403));
        }

        let bytes = match fs::metadata(&real) {
            Ok(meta) if meta.is_file() => fs::read(&real)?,
            Ok(_) => return Ok(Outcome::Status(404)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Outcome::Status(404)),
            Err(e) => return Err(Error::Io(e)),
        };

        self.response.media_type = match &options.media_type {
            Some(media_type) => media_type.clone(),
            None => guess_media_type(path).to_string(),
        };
        self.response.charset = options.charset.clone();
        debug!("Serving static file {}", resolved.display());
        Ok(Outcome::Body(Body::Bytes(bytes)))
    }

    /// Mark `outcome` as a file download.
    ///
    /// Status outcomes pass through untouched. The filename is taken from
    /// the options, else from the last static-file request, else from the
    /// last segment of the request path.
    pub fn download(&mut self, outcome: Outcome, options: &DownloadOptions) -> Result<Outcome, Error> {
        if !matches!(outcome, Outcome::Body(_)) {
            return Ok(outcome);
        }

        let filename = options
            .filename
            .clone()
            .or_else(|| self.response.last_served_filename.clone())
            .unwrap_or_else(|| {
                self.request
                    .path
                    .rsplit('/')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            });
        if filename.is_empty() {
            return Err(Error::Logic("Cannot determine filename for download".to_string()));
        }

        self.response.media_type = match &options.media_type {
            Some(media_type) => media_type.clone(),
            None => guess_media_type(&filename).to_string(),
        };
        self.response.charset = options.charset.clone();
        self.response.add_header(
            "Content-Disposition",
            format!("attachment; filename={}", quote_filename(&filename)),
        );
        Ok(outcome)
    }
}
