//! Final video composition.
//!
//! Joins the generated sign and couple clips, burns the branded overlay on
//! top and maps in the licensed audio track, by spawning `ffmpeg`. The
//! encoding settings are fixed; everything interesting happens provider-side
//! or in ffmpeg itself.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Composes the deliverable video from its input clips and static assets.
pub struct VideoComposer {
    temp_dir: PathBuf,
    overlay_path: PathBuf,
    audio_path: PathBuf,
}

impl VideoComposer {
    pub fn new(temp_dir: &Path, overlay_path: &Path, audio_path: &Path) -> Self {
        Self {
            temp_dir: temp_dir.to_path_buf(),
            overlay_path: overlay_path.to_path_buf(),
            audio_path: audio_path.to_path_buf(),
        }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Concat the two clips, apply the overlay and audio, and write
    /// `final_{id}.mp4` into the temp directory.
    pub async fn compose_final(
        &self,
        id: &str,
        sign_clip: &Path,
        couple_clip: &Path,
    ) -> Result<PathBuf, ComposeError> {
        let out_path = self.temp_dir.join(format!("final_{}.mp4", id));
        let args = self.build_args(sign_clip, couple_clip, &out_path);

        tracing::info!(id, output = %out_path.display(), "composing final video");
        let started = std::time::Instant::now();

        let output = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(ComposeError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: String = stderr
                .lines()
                .rev()
                .take(10)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect::<Vec<_>>()
                .join("\n");
            return Err(ComposeError::Ffmpeg {
                code: output.status.code(),
                stderr: tail,
            });
        }

        let elapsed = started.elapsed();
        metrics::histogram!("composition_seconds").record(elapsed.as_secs_f64());
        tracing::info!(
            id,
            elapsed_ms = elapsed.as_millis() as u64,
            output = %out_path.display(),
            "final video composed"
        );
        Ok(out_path)
    }

    fn build_args(&self, sign_clip: &Path, couple_clip: &Path, out_path: &Path) -> Vec<String> {
        let filter = "[0:v][1:v]concat=n=2:v=1:a=0[joined];\
                      [joined][2:v]overlay=0:0:shortest=1[outv]";
        let mut args: Vec<String> = ["-y", "-v", "error"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        for input in [
            sign_clip,
            couple_clip,
            self.overlay_path.as_path(),
            self.audio_path.as_path(),
        ] {
            args.push("-i".to_string());
            args.push(input.display().to_string());
        }
        args.extend(
            [
                "-filter_complex",
                filter,
                "-map",
                "[outv]",
                "-map",
                "3:a",
                "-c:v",
                "libx264",
                "-crf",
                "20",
                "-preset",
                "veryfast",
                "-c:a",
                "aac",
                "-shortest",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args.push(out_path.display().to_string());
        args
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("Failed to spawn ffmpeg: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("ffmpeg exited with code {code:?}: {stderr}")]
    Ffmpeg { code: Option<i32>, stderr: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_map_overlay_and_audio() {
        let composer = VideoComposer::new(
            Path::new("/tmp"),
            Path::new("static/overlay/logo.mov"),
            Path::new("static/audio/audio.mp4"),
        );
        let args = composer.build_args(
            Path::new("/tmp/sign.mp4"),
            Path::new("/tmp/couple.mp4"),
            Path::new("/tmp/final_x.mp4"),
        );

        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 4);
        assert!(args.iter().any(|a| a.contains("concat=n=2")));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/final_x.mp4"));
    }
}
