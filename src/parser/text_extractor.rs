//! PDF → 文本
//!
//! 逐页提取文本，去掉每页固定的页眉（1 行）和页脚（3 行）。
//! `pdf-extract` 输出的每页文本都以空行开头，页眉从第一个非空行算起。

use crate::error::{AppError, AppResult, DocumentError};
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// 每页开头的页眉行数
const PAGE_HEADER_LINES: usize = 1;
/// 每页末尾的页脚行数
const PAGE_FOOTER_LINES: usize = 3;

/// 从 PDF 字节中提取清洗后的全文
pub fn extract_text(pdf: &[u8]) -> AppResult<String> {
    let pages = decode_pages(pdf)?;
    if pages.is_empty() {
        return Err(DocumentError::NoPages.into());
    }
    debug!("PDF 共 {} 页", pages.len());
    Ok(clean_pages(&pages))
}

/// 解码每一页的文本
///
/// 解析库在畸形文档上可能 panic，这里统一转成 [`DocumentError`]。
fn decode_pages(pdf: &[u8]) -> AppResult<Vec<String>> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(pdf)
    }));
    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(AppError::invalid_pdf(e)),
        Err(_) => Err(DocumentError::ExtractorPanicked.into()),
    }
}

/// 去掉每页的页眉页脚，逐行 trim 后拼接
pub fn clean_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(|page| {
            let lines: Vec<&str> = page
                .as_ref()
                .lines()
                .skip_while(|line| line.trim().is_empty())
                .collect();
            let end = lines.len().saturating_sub(PAGE_FOOTER_LINES);
            lines
                .get(PAGE_HEADER_LINES..end)
                .unwrap_or_default()
                .iter()
                .map(|line| line.trim())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_pages_strips_boilerplate() {
        let pages = [
            "En-tête\n  Ligne A  \nLigne B\nPied 1\nPied 2\nPied 3",
            "En-tête\nLigne C\nPied 1\nPied 2\nPied 3",
        ];
        assert_eq!(clean_pages(&pages), "Ligne A\nLigne B\nLigne C");
    }

    #[test]
    fn test_short_page_contributes_nothing() {
        let pages = ["En-tête\nPied 1\nPied 2", "En-tête\nCorps\nPied 1\nPied 2\nPied 3"];
        assert_eq!(clean_pages(&pages), "\nCorps");
    }

    #[test]
    fn test_leading_blank_lines_before_header() {
        let pages = [
            "\n\nEn-tête\nSéance 1 - TP\nPied 1\nPied 2\nPied 3",
            "\n\nEn-tête\n12.000 (coeff 1.0000)\nPied 1\nPied 2\nPied 3",
        ];
        assert_eq!(clean_pages(&pages), "Séance 1 - TP\n12.000 (coeff 1.0000)");
    }

    #[test]
    fn test_extract_text_from_fixture() {
        let pdf = std::fs::read(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/transcript.pdf"
        ))
        .unwrap();
        let text = extract_text(&pdf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.first(), Some(&"Relevé des notes et absences"));
        assert_eq!(lines.last(), Some(&"Code UE 0 Fin : Signature"));
        assert!(!text.contains("Université Côte d'Azur"));
        assert!(!text.contains("Document non contractuel"));
        assert!(lines.iter().all(|line| !line.is_empty()));

        // 跨页处：第 1 页最后一行紧接第 2 页第一行
        let break_at = lines.iter().position(|l| *l == "Séance 1 - TP").unwrap();
        assert_eq!(lines[break_at + 1], "12.000 (coeff 1.0000)");
    }

    #[test]
    fn test_invalid_pdf_is_document_error() {
        let err = extract_text(b"definitely not a pdf").unwrap_err();
        assert!(err.is_document_error());
    }

    #[test]
    fn test_empty_input_is_document_error() {
        let err = extract_text(&[]).unwrap_err();
        assert!(err.is_document_error());
    }
}
