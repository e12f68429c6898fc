//! Playlist serializer
//!
//! Writes a [`Playlist`] back out as M3U8 text that the parser accepts again.

use std::fmt::{self, Write as _};
use std::path::Path;

use super::model::{IFrameStream, Key, Media, Playlist, Segment, VariantStream};

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut output = String::new();

        // Header
        output.push_str("#EXTM3U\n");
        if let Some(version) = self.version {
            output.push_str(&format!("#EXT-X-VERSION:{}\n", version));
        }
        if let Some(target) = self.target_duration {
            output.push_str(&format!("#EXT-X-TARGETDURATION:{}\n", target));
        }
        if let Some(seq) = self.media_sequence {
            output.push_str(&format!("#EXT-X-MEDIA-SEQUENCE:{}\n", seq));
        }
        if let Some(seq) = self.discontinuity_sequence {
            output.push_str(&format!("#EXT-X-DISCONTINUITY-SEQUENCE:{}\n", seq));
        }
        if let Some(allow) = self.allow_cache {
            output.push_str(&format!(
                "#EXT-X-ALLOW-CACHE:{}\n",
                if allow { "YES" } else { "NO" }
            ));
        }
        if let Some(kind) = self.playlist_type {
            output.push_str(&format!("#EXT-X-PLAYLIST-TYPE:{}\n", kind.as_str()));
        }
        if self.is_i_frames_only {
            output.push_str("#EXT-X-I-FRAMES-ONLY\n");
        }
        if self.is_independent_segments {
            output.push_str("#EXT-X-INDEPENDENT-SEGMENTS\n");
        }
        if let Some(start) = &self.start {
            output.push_str(&format!("#EXT-X-START:TIME-OFFSET={}", start.time_offset));
            if start.precise {
                output.push_str(",PRECISE=YES");
            }
            output.push('\n');
        }

        for media in &self.media {
            write_media(&mut output, media);
        }
        for stream in &self.streams {
            write_stream(&mut output, stream);
        }
        for stream in &self.iframe_streams {
            write_iframe_stream(&mut output, stream);
        }

        let mut previous: Option<&Segment> = None;
        for segment in &self.segments {
            write_segment(&mut output, segment, previous);
            previous = Some(segment);
        }

        // End list
        if self.is_endlist {
            output.push_str("#EXT-X-ENDLIST\n");
        }

        f.write_str(&output)
    }
}

impl Playlist {
    /// Serialize to `path`, creating parent directories as needed.
    pub fn dump<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_string())
    }
}

fn write_segment(output: &mut String, segment: &Segment, previous: Option<&Segment>) {
    if segment.key != previous.and_then(|p| p.key.clone()) {
        match &segment.key {
            Some(key) => write_key(output, key),
            None => output.push_str("#EXT-X-KEY:METHOD=NONE\n"),
        }
    }
    if let Some(map) = &segment.init_section {
        if previous.and_then(|p| p.init_section.as_ref()) != Some(map) {
            output.push_str(&format!("#EXT-X-MAP:URI=\"{}\"", map.uri));
            if let Some(range) = &map.byte_range {
                output.push_str(&format!(",BYTERANGE=\"{}\"", range));
            }
            output.push('\n');
        }
    }
    if segment.discontinuity {
        output.push_str("#EXT-X-DISCONTINUITY\n");
    }
    // Timestamps that follow from the previous segment are re-derived on parse
    if let Some(pdt) = &segment.program_date_time {
        let expected = previous.and_then(Segment::end_date_time);
        if segment.discontinuity || expected.as_ref() != Some(pdt) {
            output.push_str(&format!("#EXT-X-PROGRAM-DATE-TIME:{}\n", pdt.to_rfc3339()));
        }
    }
    if segment.cue_out {
        output.push_str("#EXT-X-CUE-OUT\n");
    }
    if segment.cue_in {
        output.push_str("#EXT-X-CUE-IN\n");
    }

    output.push_str(&format!(
        "#EXTINF:{},{}\n",
        segment.duration,
        segment.title.as_deref().unwrap_or("")
    ));
    if let Some(range) = &segment.byte_range {
        output.push_str(&format!("#EXT-X-BYTERANGE:{}\n", range));
    }
    output.push_str(&segment.uri);
    output.push('\n');
}

fn write_key(output: &mut String, key: &Key) {
    output.push_str(&format!("#EXT-X-KEY:METHOD={}", key.method.as_str()));
    if let Some(uri) = &key.uri {
        output.push_str(&format!(",URI=\"{}\"", uri));
    }
    if let Some(iv) = &key.iv {
        output.push_str(&format!(",IV={}", iv));
    }
    if let Some(format) = &key.keyformat {
        output.push_str(&format!(",KEYFORMAT=\"{}\"", format));
    }
    if let Some(versions) = &key.keyformatversions {
        output.push_str(&format!(",KEYFORMATVERSIONS=\"{}\"", versions));
    }
    output.push('\n');
}

fn write_media(output: &mut String, media: &Media) {
    let mut attrs = vec![
        format!("TYPE={}", media.media_type.as_str()),
        format!("GROUP-ID=\"{}\"", media.group_id),
        format!("NAME=\"{}\"", media.name),
    ];
    if let Some(lang) = &media.language {
        attrs.push(format!("LANGUAGE=\"{}\"", lang));
    }
    if let Some(lang) = &media.assoc_language {
        attrs.push(format!("ASSOC-LANGUAGE=\"{}\"", lang));
    }
    if media.is_default {
        attrs.push("DEFAULT=YES".to_string());
    }
    if media.is_autoselect {
        attrs.push("AUTOSELECT=YES".to_string());
    }
    if media.is_forced {
        attrs.push("FORCED=YES".to_string());
    }
    if let Some(id) = &media.instream_id {
        attrs.push(format!("INSTREAM-ID=\"{}\"", id));
    }
    if let Some(c) = &media.characteristics {
        attrs.push(format!("CHARACTERISTICS=\"{}\"", c));
    }
    if let Some(c) = &media.channels {
        attrs.push(format!("CHANNELS=\"{}\"", c));
    }
    if let Some(uri) = &media.uri {
        attrs.push(format!("URI=\"{}\"", uri));
    }
    push_extra(&mut attrs, &media.extra);
    output.push_str(&format!("#EXT-X-MEDIA:{}\n", attrs.join(",")));
}

fn write_stream(output: &mut String, stream: &VariantStream) {
    let mut attrs = Vec::new();
    if let Some(id) = stream.program_id {
        attrs.push(format!("PROGRAM-ID={}", id));
    }
    attrs.push(format!("BANDWIDTH={}", stream.bandwidth));
    if let Some(avg) = stream.average_bandwidth {
        attrs.push(format!("AVERAGE-BANDWIDTH={}", avg));
    }
    if let Some(res) = &stream.resolution {
        attrs.push(format!("RESOLUTION={}", res));
    }
    if let Some(codecs) = &stream.codecs {
        attrs.push(format!("CODECS=\"{}\"", codecs));
    }
    if let Some(rate) = stream.frame_rate {
        attrs.push(format!("FRAME-RATE={:.3}", rate));
    }
    for (key, group) in [
        ("AUDIO", &stream.audio),
        ("VIDEO", &stream.video),
        ("SUBTITLES", &stream.subtitles),
    ] {
        if let Some(group) = group {
            attrs.push(format!("{}=\"{}\"", key, group));
        }
    }
    match stream.closed_captions.as_deref() {
        Some("NONE") => attrs.push("CLOSED-CAPTIONS=NONE".to_string()),
        Some(group) => attrs.push(format!("CLOSED-CAPTIONS=\"{}\"", group)),
        None => {}
    }
    push_extra(&mut attrs, &stream.extra);
    let _ = writeln!(output, "#EXT-X-STREAM-INF:{}", attrs.join(","));
    output.push_str(&stream.uri);
    output.push('\n');
}

fn write_iframe_stream(output: &mut String, stream: &IFrameStream) {
    let mut attrs = Vec::new();
    if let Some(id) = stream.program_id {
        attrs.push(format!("PROGRAM-ID={}", id));
    }
    attrs.push(format!("BANDWIDTH={}", stream.bandwidth));
    if let Some(res) = &stream.resolution {
        attrs.push(format!("RESOLUTION={}", res));
    }
    if let Some(codecs) = &stream.codecs {
        attrs.push(format!("CODECS=\"{}\"", codecs));
    }
    attrs.push(format!("URI=\"{}\"", stream.uri));
    push_extra(&mut attrs, &stream.extra);
    let _ = writeln!(output, "#EXT-X-I-FRAME-STREAM-INF:{}", attrs.join(","));
}

fn push_extra(attrs: &mut Vec<String>, extra: &[(String, String)]) {
    for (key, value) in extra {
        let needs_quotes =
            value.is_empty() || value.contains(|c: char| c == ',' || c == '=' || c.is_whitespace());
        if needs_quotes {
            attrs.push(format!("{}=\"{}\"", key, value));
        } else {
            attrs.push(format!("{}={}", key, value));
        }
    }
}
