/// Plain text and markdown are returned verbatim. Invalid UTF-8 sequences are
/// replaced rather than rejected; blank files are not an error here.
pub fn extract(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
