//! Static file resolution under a site root.

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::http::mime;
use crate::http::response::Response;
use crate::http::status::StatusCode;

/// Fills `res` with the file `uri` names under `root`.
///
/// Directories are served through their `index.html`. Paths that normalize
/// to somewhere outside the root are refused with 403.
pub async fn serve(root: &Path, uri: &str, res: &mut Response) {
    let root = match absolute(root) {
        Ok(root) => root,
        Err(e) => {
            tracing::error!(root = %root.display(), error = %e, "Cannot resolve site root");
            res.set_status(StatusCode::InternalServerError);
            res.set_html(format!("There was an error while fetching resource <b>{}</b>", escape_html(uri)));
            return;
        }
    };

    let mut target = strip_query(uri).to_string();
    if target.is_empty() {
        target.push('.');
    }

    loop {
        let path = normalize(&root.join(target.trim_start_matches('/')));
        res.set_content_type(mime::for_path(&path));

        if !path.starts_with(&root) {
            tracing::warn!(uri = %uri, path = %path.display(), "Path escapes site root");
            res.set_status(StatusCode::Forbidden);
            res.set_html(format!("Resource <b>{}</b> is outside the site", escape_html(&target)));
            return;
        }

        let Ok(meta) = tokio::fs::metadata(&path).await else {
            res.set_status(StatusCode::NotFound);
            res.set_html(format!("Resource at <b>{}</b> doesn't exist", escape_html(&target)));
            return;
        };

        if meta.is_dir() {
            let index = path.join("index.html");
            if tokio::fs::try_exists(&index).await.unwrap_or(false) {
                if !target.ends_with('/') {
                    target.push('/');
                }
                target.push_str("index.html");
                continue;
            }

            res.set_status(StatusCode::NotImplemented);
            res.set_html(format!(
                "Resource <b>{}</b> is a directory. No support for that yet",
                escape_html(&target)
            ));
            return;
        }

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                res.set_binary(bytes);
                res.set_status(StatusCode::Ok);
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to read file");
                res.set_status(StatusCode::InternalServerError);
                res.set_html(format!(
                    "There was an error while fetching resource <b>{}</b>",
                    escape_html(&target)
                ));
            }
        }
        return;
    }
}

/// Drops the query and fragment from a request target.
fn strip_query(uri: &str) -> &str {
    uri.split(['?', '#']).next().unwrap_or("")
}

fn absolute(path: &Path) -> io::Result<PathBuf> {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(normalize(&path))
}

/// Resolves `.` and `..` lexically. `..` at the filesystem root stays there.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if out.file_name().is_some() {
                    out.pop();
                }
            }
            Component::Normal(part) => out.push(part),
        }
    }

    out
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
