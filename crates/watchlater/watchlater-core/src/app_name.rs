// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Mapping from a video URL to the name of the platform hosting it.

use url::Url;

/// Label used when no platform can be recognized.
pub const UNKNOWN_APP: &str = "unknown";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::AsRefStr,
    strum_macros::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum Platform {
    Youtube,
    Vimeo,
    Twitch,
    Tiktok,
    Instagram,
    Facebook,
    Dailymotion,
    Soundcloud,
    Twitter,
    Reddit,
    Streamable,
    Spotify,
    Bilibili,
    Kick,
    Unknown,
}

/// Registrable domains per platform. Subdomains (`www.`, `m.`, `music.`, ...)
/// match their parent.
const DOMAINS: &[(&str, Platform)] = &[
    ("youtube.com", Platform::Youtube),
    ("youtu.be", Platform::Youtube),
    ("youtube-nocookie.com", Platform::Youtube),
    ("vimeo.com", Platform::Vimeo),
    ("twitch.tv", Platform::Twitch),
    ("tiktok.com", Platform::Tiktok),
    ("instagram.com", Platform::Instagram),
    ("facebook.com", Platform::Facebook),
    ("fb.watch", Platform::Facebook),
    ("dailymotion.com", Platform::Dailymotion),
    ("dai.ly", Platform::Dailymotion),
    ("soundcloud.com", Platform::Soundcloud),
    ("twitter.com", Platform::Twitter),
    ("x.com", Platform::Twitter),
    ("reddit.com", Platform::Reddit),
    ("redd.it", Platform::Reddit),
    ("streamable.com", Platform::Streamable),
    ("spotify.com", Platform::Spotify),
    ("bilibili.com", Platform::Bilibili),
    ("b23.tv", Platform::Bilibili),
    ("kick.com", Platform::Kick),
];

impl Platform {
    pub fn from_url(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::Unknown;
        }
        // Pasted links often omit the scheme.
        let parsed = if raw.contains("://") {
            Url::parse(raw)
        } else {
            Url::parse(&format!("https://{raw}"))
        };
        let Ok(url) = parsed else {
            return Self::Unknown;
        };
        if !matches!(url.scheme(), "http" | "https") {
            return Self::Unknown;
        }
        url.host_str()
            .map_or(Self::Unknown, |host| Self::from_host(&host.to_ascii_lowercase()))
    }

    fn from_host(host: &str) -> Self {
        let host = host.trim_end_matches('.');
        DOMAINS
            .iter()
            .find(|(domain, _)| {
                host == *domain
                    || host
                        .strip_suffix(domain)
                        .is_some_and(|prefix| prefix.ends_with('.'))
            })
            .map_or(Self::Unknown, |(_, platform)| *platform)
    }
}

/// Platform label stored in an entry's `app` field. Never fails; anything
/// unrecognized yields [`UNKNOWN_APP`].
pub fn derive_app_name(url: &str) -> String { Platform::from_url(url).to_string() }

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn recognizes_youtube_variants() {
        for url in [
            "https://youtube.com/watch?v=x",
            "https://www.youtube.com/watch?v=x",
            "https://m.youtube.com/watch?v=x",
            "https://music.youtube.com/watch?v=x",
            "https://youtu.be/x",
            "youtube.com/watch?v=x",
            "HTTPS://WWW.YOUTUBE.COM/watch?v=x",
        ] {
            assert_eq!(derive_app_name(url), "youtube", "{url}");
        }
    }

    #[test]
    fn recognizes_other_platforms() {
        assert_eq!(derive_app_name("https://vimeo.com/123"), "vimeo");
        assert_eq!(derive_app_name("https://www.twitch.tv/videos/1"), "twitch");
        assert_eq!(derive_app_name("https://x.com/user/status/1"), "twitter");
        assert_eq!(derive_app_name("https://fb.watch/abc"), "facebook");
        assert_eq!(derive_app_name("https://old.reddit.com/r/videos"), "reddit");
    }

    #[test]
    fn falls_back_for_empty_and_unrecognized() {
        assert_eq!(derive_app_name(""), UNKNOWN_APP);
        assert_eq!(derive_app_name("   "), UNKNOWN_APP);
        assert_eq!(derive_app_name("not a url"), UNKNOWN_APP);
        assert_eq!(derive_app_name("https://example.com/video.mp4"), UNKNOWN_APP);
        assert_eq!(derive_app_name("ftp://youtube.com/x"), UNKNOWN_APP);
        assert_eq!(derive_app_name("https://notyoutube.com/watch"), UNKNOWN_APP);
        assert_eq!(derive_app_name("https://youtube.com.evil.net/"), UNKNOWN_APP);
    }

    #[test]
    fn every_platform_has_a_nonempty_label() {
        for platform in Platform::iter() {
            assert!(!platform.as_ref().is_empty());
        }
        assert_eq!(Platform::Unknown.to_string(), UNKNOWN_APP);
    }
}
