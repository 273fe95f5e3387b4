//! Generate a deterministic sample listening history for manual testing.
//!
//! Usage: `cargo run --bin generate_sample [output.csv]`

use std::env;

use anyhow::{Context, Result};

/// Minimal deterministic PRNG (splitmix64).
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo)
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const CATALOG: &[(&str, &str, &[&str])] = &[
    (
        "The Midnight Coders",
        "Segfault Serenades",
        &["Null Pointer Blues", "Borrowed Time", "Heap of Love"],
    ),
    (
        "Clara Voss",
        "Evening Light",
        &["Harbour", "Slow Rain", "Northern Line", "Afterglow"],
    ),
    (
        "Static Garden",
        "Transmission",
        &["Signal Lost", "Carrier Wave", "Interference"],
    ),
    (
        "Ocean Cartography",
        "Soundings",
        &["Fathom", "Drift", "Leeward", "Ballast"],
    ),
];

const PLATFORMS: &[&str] = &["android", "ios", "web player", "linux"];

fn main() -> Result<()> {
    env_logger::init();

    let out = env::args()
        .nth(1)
        .unwrap_or_else(|| "spotify_history.csv".to_string());

    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(&out).with_context(|| format!("creating {out}"))?;
    writer.write_record([
        "ts",
        "artist_name",
        "album_name",
        "track_name",
        "ms_played",
        "platform",
    ])?;

    let mut rows = 0usize;
    for day in 0..90u64 {
        let month = 1 + day / 28;
        let day_of_month = 1 + day % 28;

        for _ in 0..rng.range(3, 12) {
            let &(artist, album, tracks) = rng.pick(CATALOG);
            let track = *rng.pick(tracks);
            let platform = *rng.pick(PLATFORMS);

            // Listening clusters in the evening, with a morning tail.
            let hour = if rng.next_u64() % 3 == 0 {
                rng.range(7, 12)
            } else {
                rng.range(17, 24)
            };

            // Mostly full listens, with the occasional sub-5-second skip.
            let ms_played = if rng.next_u64() % 8 == 0 {
                rng.range(400, 4_800)
            } else {
                rng.range(45_000, 320_000)
            };

            let ts = format!(
                "2024-{month:02}-{day_of_month:02}T{hour:02}:{:02}:{:02}Z",
                rng.range(0, 60),
                rng.range(0, 60),
            );
            let ms = ms_played.to_string();
            writer.write_record([ts.as_str(), artist, album, track, ms.as_str(), platform])?;
            rows += 1;
        }
    }

    // One malformed timestamp so the coerce-and-drop path is visible.
    writer.write_record([
        "not-a-date",
        "The Midnight Coders",
        "Segfault Serenades",
        "Null Pointer Blues",
        "60000",
        "android",
    ])?;
    rows += 1;

    writer.flush()?;
    println!("wrote {rows} rows to {out}");
    Ok(())
}
