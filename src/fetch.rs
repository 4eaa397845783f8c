use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::dubbing::{DubbedMedia, DubbingService};
use crate::error::{DubError, Result};
use crate::media::dubbed_file_name;

/// Download the dubbed output of `job_id` into `output_dir`.
///
/// The body is streamed to a `.part` file which is renamed into place only
/// after the last chunk is written, so a failed transfer leaves nothing at
/// the final path.
pub async fn fetch_dubbed(
    service: &dyn DubbingService,
    job_id: &str,
    target_lang: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).await?;

    let media = service.download(job_id, target_lang).await?;

    let final_path = output_dir.join(dubbed_file_name(job_id, target_lang));
    let part_path = final_path.with_extension("mp4.part");

    match write_stream(media, &part_path).await {
        Ok(written) => {
            fs::rename(&part_path, &final_path).await?;
            info!("Saved {} bytes to {}", written, final_path.display());
            Ok(final_path)
        }
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&part_path).await {
                warn!("Failed to remove {}: {}", part_path.display(), cleanup);
            }
            Err(e)
        }
    }
}

async fn write_stream(media: DubbedMedia, path: &Path) -> Result<u64> {
    let pb = progress_bar(media.content_length);
    let mut file = fs::File::create(path).await?;
    let mut body = media.body;
    let mut written = 0u64;

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .map_err(|e| DubError::Fetch(format!("write to {} failed: {}", path.display(), e)))?;
        written += chunk.len() as u64;
        pb.set_position(written);
    }

    file.flush().await?;
    pb.finish_and_clear();
    Ok(written)
}

fn progress_bar(content_length: Option<u64>) -> ProgressBar {
    match content_length {
        Some(len) => {
            let pb = ProgressBar::new(len);
            if let Ok(style) = ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
            ) {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {bytes}") {
                pb.set_style(style);
            }
            pb
        }
    }
}
