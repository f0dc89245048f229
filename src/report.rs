use crate::types::StatusResponse;
use std::io::{self, Write};

pub const COMPLETION_MARKER: &str = "Completed!";

/// Writes the completion marker line followed by the raw status body.
pub fn report<W: Write>(response: &StatusResponse, mut out: W) -> io::Result<()> {
    writeln!(out, "{}", COMPLETION_MARKER)?;
    writeln!(out, "{}", response.raw)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_marker_then_raw_body() {
        let raw = r#"{"message":"Request processed successfully","response_data":{"status":"COMPLETED","result":{"output":["https://example.com/0.png"]}}}"#;
        let response = StatusResponse::from_body(raw.to_string()).unwrap();

        let mut out = Vec::new();
        report(&response, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), format!("Completed!\n{}\n", raw));
    }
}
