use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Video dubbing using ElevenLabs", long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Check status of dubbing with given ID
    #[arg(long, value_name = "ID")]
    pub check_dubbing: Option<String>,

    /// Download completed dubbing with given ID
    #[arg(long, value_name = "ID")]
    pub download_dubbing: Option<String>,

    /// Wait for dubbing to complete and download automatically
    #[arg(long, value_name = "ID")]
    pub wait_and_download: Option<String>,

    /// Download a video from this URL, dub it and fetch the result
    #[arg(long, value_name = "URL")]
    pub youtube_url: Option<String>,

    /// Path to input video file
    #[arg(long, value_name = "PATH")]
    pub input_file: Option<PathBuf>,

    /// Target language code (default: ru)
    #[arg(long, value_name = "CODE")]
    pub target_lang: Option<String>,

    /// Directory for downloaded and dubbed files
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Write the default configuration to this path and exit
    #[arg(long, value_name = "PATH")]
    pub write_config: Option<PathBuf>,
}

/// What a single invocation does, resolved from the flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Check(String),
    Download(String),
    WaitAndDownload(String),
    Youtube(String),
    /// Submit a local file; `None` means the configured fallback
    Submit(Option<PathBuf>),
}

impl Args {
    /// First matching flag wins.
    pub fn action(&self) -> Action {
        if let Some(id) = &self.check_dubbing {
            Action::Check(id.clone())
        } else if let Some(id) = &self.download_dubbing {
            Action::Download(id.clone())
        } else if let Some(id) = &self.wait_and_download {
            Action::WaitAndDownload(id.clone())
        } else if let Some(url) = &self.youtube_url {
            Action::Youtube(url.clone())
        } else {
            Action::Submit(self.input_file.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("dubber").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_flags_submits_fallback() {
        let args = parse(&[]);
        assert_eq!(args.action(), Action::Submit(None));
        assert_eq!(args.target_lang, None);
    }

    #[test]
    fn check_takes_precedence() {
        let args = parse(&["--download-dubbing", "b", "--check-dubbing", "a", "--input-file", "x.mp4"]);
        assert_eq!(args.action(), Action::Check("a".to_string()));
    }

    #[test]
    fn download_beats_wait() {
        let args = parse(&["--wait-and-download", "w", "--download-dubbing", "d"]);
        assert_eq!(args.action(), Action::Download("d".to_string()));
    }

    #[test]
    fn youtube_url_beats_input_file() {
        let args = parse(&["--input-file", "x.mp4", "--youtube-url", "https://youtu.be/abc"]);
        assert_eq!(args.action(), Action::Youtube("https://youtu.be/abc".to_string()));
    }

    #[test]
    fn equals_syntax_is_accepted() {
        let args = parse(&["--wait-and-download=job42", "--target-lang=es"]);
        assert_eq!(args.action(), Action::WaitAndDownload("job42".to_string()));
        assert_eq!(args.target_lang.as_deref(), Some("es"));
    }

    #[test]
    fn input_file_is_submitted() {
        let args = parse(&["--input-file", "clip.webm"]);
        assert_eq!(args.action(), Action::Submit(Some(PathBuf::from("clip.webm"))));
    }
}
