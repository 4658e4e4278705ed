use collage_packer_core::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_sizes(seed: u64, count: usize, min: u32, max: u32) -> Vec<(String, u32, u32)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            (
                format!("img_{i}"),
                rng.gen_range(min..=max),
                rng.gen_range(min..=max),
            )
        })
        .collect()
}

#[test]
fn roomy_canvas_places_everything_in_first_pass() {
    for seed in 0..8 {
        let sizes = random_sizes(seed, 10, 16, 100);
        let total: u64 = sizes.iter().map(|(_, w, h)| *w as u64 * *h as u64).sum();
        assert!(1000 * 1000 >= 2 * total);
        let cfg = PackerConfig::builder().with_canvas(1000, 1000).build();
        let layout = pack_layout(sizes, cfg).expect("layout");
        assert_eq!(layout.placements.len(), 10, "seed {seed}");
        assert!(layout.dropped.is_empty());
        assert!(
            layout.placements.iter().all(|p| p.pass == Pass::FirstFit),
            "seed {seed}: second pass should not run"
        );
        assert_eq!(layout.stats().num_ratio_match, 0);
    }
}

#[test]
fn first_pass_only_admits_regions_that_hold_native_size() {
    for seed in 0..8 {
        let cfg = PackerConfig::builder().with_canvas(640, 480).build();
        let layout = pack_layout(random_sizes(seed, 30, 20, 260), cfg).expect("layout");
        for p in layout.placements.iter().filter(|p| p.pass == Pass::FirstFit) {
            assert!(
                p.source_size.0 <= p.region.w && p.source_size.1 <= p.region.h,
                "{} {:?} does not fit {:?}",
                p.key,
                p.source_size,
                p.region
            );
            assert!(matches!(p.fit, FitKind::Native | FitKind::TopUp));
        }
    }
}

#[test]
fn catalog_is_walked_smallest_first() {
    let cfg = PackerConfig::builder().with_canvas(500, 500).build();
    let layout = pack_layout(vec![("big", 200, 200), ("mid", 100, 100), ("tiny", 20, 20)], cfg)
        .expect("layout");
    let keys: Vec<&str> = layout.placements.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["tiny", "mid", "big"]);
}
