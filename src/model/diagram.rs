/// A decoded compartment diagram, ready to be attached to a model request.
///
/// The original file bytes are kept as-is; decoding only proves they are an
/// image format the service accepts.
#[derive(Debug, Clone)]
pub struct DiagramImage {
    pub file_name: String,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}
