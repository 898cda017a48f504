//! Sample documents used across tests

/// Short article about photosynthesis with clearly separable sentences
pub const PHOTOSYNTHESIS: &str = "Photosynthesis is the process plants use to turn light into chemical energy. \
Chlorophyll in the leaves absorbs mostly red and blue light. \
The process produces oxygen as a byproduct and stores energy in glucose. \
Water is split during the light reactions, releasing oxygen into the air. \
The Calvin cycle then fixes carbon dioxide into sugars inside the chloroplast.";

/// A second, unrelated document
pub const RUST_OWNERSHIP: &str = "Rust enforces memory safety through ownership. \
Every value has a single owner and is dropped when the owner goes out of scope. \
Borrowing lets code reference a value without taking ownership of it. \
The borrow checker rejects programs that would create dangling references.";

/// Build a plain text body of `words` repeated filler words
pub fn long_document(words: usize) -> String {
    (0..words)
        .map(|i| format!("word{}", i % 50))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Single-page PDF drawing `content` as its page stream, with Helvetica
/// registered as `/F1`
pub fn pdf_with_content(content: &str) -> Vec<u8> {
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    pdf.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref
        )
        .as_bytes(),
    );
    pdf
}

/// PDF whose only text is "Hello"
pub fn hello_pdf() -> Vec<u8> {
    pdf_with_content("BT /F1 12 Tf 72 720 Td (Hello) Tj ET")
}
