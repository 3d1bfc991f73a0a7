use crate::config::{Configuration, Rendition};

/// `-maxrate` is 7% above the target bitrate.
pub fn max_rate(video_bitrate: u64) -> u64 {
    video_bitrate * 107 / 100
}

/// `-bufsize` is one and a half times the target bitrate.
pub fn buffer_size(video_bitrate: u64) -> u64 {
    video_bitrate * 3 / 2
}

/// Argument list for the transcoder: one looping real-time input, one HLS
/// output per rendition written under `./<rendition>/`.
pub fn transcode_args(config: &Configuration) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();

    if !config.ffmpeg_log_level.is_empty() {
        args.push("-v".to_string());
        args.push(config.ffmpeg_log_level.clone());
    }

    args.extend(
        ["-re", "-fflags", "+genpts", "-stream_loop", "-1", "-i"]
            .iter()
            .map(|s| s.to_string()),
    );
    args.push(config.source_file.clone());

    for rendition in &config.renditions {
        args.extend(rendition_args(config, rendition));
    }

    args
}

fn rendition_args(config: &Configuration, rendition: &Rendition) -> Vec<String> {
    let scale = format!(
        "scale=w={}:h={}:force_original_aspect_ratio=decrease",
        rendition.width, rendition.height
    );

    vec![
        "-vf".to_string(),
        scale,
        "-c:a".to_string(),
        config.audio_codec.clone(),
        "-ar".to_string(),
        rendition.audio_sample_rate.to_string(),
        "-b:a".to_string(),
        rendition.audio_bitrate.to_string(),
        "-c:v".to_string(),
        config.video_codec.clone(),
        "-b:v".to_string(),
        rendition.video_bitrate.to_string(),
        "-maxrate".to_string(),
        max_rate(rendition.video_bitrate).to_string(),
        "-bufsize".to_string(),
        buffer_size(rendition.video_bitrate).to_string(),
        "-profile:v".to_string(),
        rendition.video_profile.clone(),
        "-crf".to_string(),
        config.crf.to_string(),
        "-sc_threshold".to_string(),
        "0".to_string(),
        "-g".to_string(),
        config.gop_size.to_string(),
        "-keyint_min".to_string(),
        config.gop_size.to_string(),
        "-f".to_string(),
        "hls".to_string(),
        "-hls_flags".to_string(),
        "program_date_time+omit_endlist".to_string(),
        "-hls_time".to_string(),
        config.segment_size.to_string(),
        "-hls_list_size".to_string(),
        config.hls_list_size.to_string(),
        "-hls_segment_filename".to_string(),
        format!("./{}/chunk%d.ts", rendition.name),
        format!("./{}/{}", rendition.name, rendition.manifest_name()),
    ]
}
