use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::ImageReader;

use crate::error::LoadError;
use crate::model::diagram::DiagramImage;
use crate::model::metamodel::Metamodel;

/// Reads the metamodel JSON. Reloaded on every run, never cached.
pub fn load_metamodel(path: &Path) -> Result<Metamodel, LoadError> {
    let raw = fs::read_to_string(path).map_err(|e| LoadError::from_io(path, e))?;

    let document = serde_json::from_str(&raw).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Metamodel {
        source_name: path.display().to_string(),
        document,
    })
}

/// Opens `<dir>/<file_name>` and checks that it decodes as PNG or JPEG.
pub fn load_diagram(dir: &Path, file_name: &str) -> Result<DiagramImage, LoadError> {
    let path = dir.join(file_name);
    let bytes = fs::read(&path).map_err(|e| LoadError::from_io(&path, e))?;

    let decode_err = |source| LoadError::Decode {
        path: path.clone(),
        source,
    };

    let reader = ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()
        .map_err(|e| LoadError::from_io(&path, e))?;

    let format = reader.format().ok_or_else(|| {
        decode_err(image::ImageError::Unsupported(
            image::error::UnsupportedError::from_format_and_kind(
                image::error::ImageFormatHint::PathExtension(path.clone()),
                image::error::UnsupportedErrorKind::Format(
                    image::error::ImageFormatHint::Unknown,
                ),
            ),
        ))
    })?;

    let decoded = reader.decode().map_err(decode_err)?;

    Ok(DiagramImage {
        file_name: file_name.to_string(),
        mime_type: format.to_mime_type(),
        width: decoded.width(),
        height: decoded.height(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn write_png(dir: &Path, name: &str) {
        let img = RgbImage::from_pixel(4, 3, Rgb([200, 10, 10]));
        img.save_with_format(dir.join(name), ImageFormat::Png).unwrap();
    }

    #[test]
    fn metamodel_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_metamodel(&dir.path().join("metamodel.json")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn metamodel_with_bad_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metamodel.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_metamodel(&path).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn metamodel_loads_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metamodel.json");
        fs::write(&path, r#"{"root":"SEIRModel"}"#).unwrap();

        let metamodel = load_metamodel(&path).unwrap();
        assert_eq!(metamodel.document["root"], "SEIRModel");
    }

    #[test]
    fn diagram_decodes_png() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "simple.png");

        let diagram = load_diagram(dir.path(), "simple.png").unwrap();
        assert_eq!(diagram.mime_type, "image/png");
        assert_eq!((diagram.width, diagram.height), (4, 3));
        assert!(!diagram.bytes.is_empty());
    }

    #[test]
    fn diagram_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_diagram(dir.path(), "absent.png").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn diagram_garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("fake.png"), b"definitely not pixels").unwrap();

        let err = load_diagram(dir.path(), "fake.png").unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
    }
}
