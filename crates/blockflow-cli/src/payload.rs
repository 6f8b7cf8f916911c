//! Host-side payloads: decoding files and images onto source nodes and
//! encoding processed images back to disk.

use std::path::{Path, PathBuf};

use blockflow_core::{CoreError, FlowGraph, ImageData, NodeKind, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("expected KEY=PATH, got '{0}'")]
    BadAssignment(String),

    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create '{}': {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode image '{}': {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("failed to write '{}': {source}", .path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("node key '{key}' cannot be used as an output file name")]
    UnsafeKey { key: String },

    #[error(transparent)]
    Graph(#[from] CoreError),
}

/// A `KEY=PATH` pair from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub key: String,
    pub path: PathBuf,
}

/// Parses `KEY=PATH`; the key is everything before the first `=`.
pub fn parse_assignment(arg: &str) -> Result<Assignment, PayloadError> {
    match arg.split_once('=') {
        Some((key, path)) if !key.is_empty() && !path.is_empty() => Ok(Assignment {
            key: key.to_string(),
            path: PathBuf::from(path),
        }),
        _ => Err(PayloadError::BadAssignment(arg.to_string())),
    }
}

/// Reads a text file onto the file-source node named by `assignment.key`.
pub fn attach_text(graph: &mut FlowGraph, assignment: &Assignment) -> Result<(), PayloadError> {
    let id = graph.require_key(&assignment.key)?;
    let text = std::fs::read_to_string(&assignment.path).map_err(|source| PayloadError::Read {
        path: assignment.path.clone(),
        source,
    })?;
    graph.attach_file_content(id, text)?;
    Ok(())
}

/// Decodes an image file (any format the `image` crate knows) as RGBA8.
pub fn load_image(path: &Path) -> Result<ImageData, PayloadError> {
    let rgba = image::open(path)
        .map_err(|source| PayloadError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(ImageData::new(width, height, rgba.into_raw())?)
}

/// Decodes an image onto the image-source node named by `assignment.key`.
pub fn attach_image(graph: &mut FlowGraph, assignment: &Assignment) -> Result<(), PayloadError> {
    let id = graph.require_key(&assignment.key)?;
    let image = load_image(&assignment.path)?;
    graph.attach_image(id, image)?;
    Ok(())
}

/// Writes an RGBA buffer; the format follows the file extension.
pub fn save_image(image: &ImageData, path: &Path) -> Result<(), PayloadError> {
    image::save_buffer(
        path,
        image.data(),
        image.width(),
        image.height(),
        image::ColorType::Rgba8,
    )
    .map_err(|source| PayloadError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes every node's processed image as `<key>.png` into `dir`.
///
/// Image sources are skipped; only images a run produced are written. Keys
/// are checked before anything is written, so a key that would escape `dir`
/// leaves the directory untouched.
pub fn save_outputs(graph: &FlowGraph, dir: &Path) -> Result<Vec<PathBuf>, PayloadError> {
    let outputs = graph
        .nodes()
        .filter(|(_, node)| !matches!(node.kind, NodeKind::ImageSource { .. }))
        .filter_map(|(_, node)| match &node.state.result {
            Some(Value::Image(image)) => Some((node.key.as_str(), image)),
            _ => None,
        })
        .map(|(key, image)| Ok((output_file_name(key)?, image)))
        .collect::<Result<Vec<_>, PayloadError>>()?;

    std::fs::create_dir_all(dir).map_err(|source| PayloadError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut written = Vec::new();
    for (name, image) in outputs {
        let path = dir.join(name);
        save_image(image, &path)?;
        tracing::debug!(path = %path.display(), "wrote image");
        written.push(path);
    }
    Ok(written)
}

/// `<key>.png`, provided the key is a plain file name.
fn output_file_name(key: &str) -> Result<String, PayloadError> {
    let plain = !key.is_empty()
        && key != "."
        && key != ".."
        && !key.contains(['/', '\\', '\0']);
    if plain {
        Ok(format!("{}.png", key))
    } else {
        Err(PayloadError::UnsafeKey {
            key: key.to_string(),
        })
    }
}
