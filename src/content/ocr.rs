use async_trait::async_trait;
use image::DynamicImage;
use std::io::Cursor;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::ContentError;

/// Text extraction from an already-decoded image.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn extract_text(&self, image: &DynamicImage) -> Result<String, ContentError>;
}

/// Decode uploaded bytes, sniffing the format from the content itself.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, ContentError> {
    image::load_from_memory(bytes).map_err(|e| ContentError::ImageDecode(e.to_string()))
}

/// Runs the `tesseract` CLI, feeding a PNG on stdin and reading text from stdout.
pub struct TesseractOcr {
    binary: String,
    language: String,
}

impl TesseractOcr {
    pub fn new(binary: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn extract_text(&self, image: &DynamicImage) -> Result<String, ContentError> {
        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, image::ImageFormat::Png)
            .map_err(|e| ContentError::Ocr(format!("Failed to encode image: {}", e)))?;
        let png = png.into_inner();

        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", self.language.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ContentError::Ocr(format!("Failed to start {}: {}", self.binary, e)))?;

        // Feed stdin from a separate task so a full stdout pipe can't stall the write.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ContentError::Ocr("tesseract stdin unavailable".to_string()))?;
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&png).await;
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ContentError::Ocr(format!("tesseract did not finish: {}", e)))?;

        match writer.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(ContentError::Ocr(format!("Failed to send image: {}", e))),
            Err(e) => return Err(ContentError::Ocr(format!("Writer task failed: {}", e))),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ContentError::Ocr(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_image_bytes() {
        let err = decode_image(b"definitely not a png").unwrap_err();
        assert!(matches!(err, ContentError::ImageDecode(_)));
    }

    #[test]
    fn decodes_png_bytes() {
        let img = image::RgbImage::from_pixel(4, 3, image::Rgb([255, 255, 255]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();

        let decoded = decode_image(&buf.into_inner()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }

    #[tokio::test]
    async fn missing_binary_is_an_ocr_failure() {
        let ocr = TesseractOcr::new("/nonexistent/tesseract-binary", "eng");
        let img = DynamicImage::new_rgb8(2, 2);
        let err = ocr.extract_text(&img).await.unwrap_err();
        assert!(matches!(err, ContentError::Ocr(_)));
    }
}
