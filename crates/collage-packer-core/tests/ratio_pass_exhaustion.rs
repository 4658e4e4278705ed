use collage_packer_core::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn catalog(sizes: &[(String, u32, u32)]) -> Catalog {
    Catalog::from_items(
        sizes
            .iter()
            .map(|(k, w, h)| Item::new(k.clone(), *w, *h).expect("item"))
            .collect(),
    )
}

#[test]
fn oversized_item_is_downscaled_never_first_fit() {
    let cfg = PackerConfig::builder().with_canvas(200, 100).build();
    let layout = pack_layout(vec![("huge", 500, 400)], cfg).expect("layout");
    assert_eq!(layout.placements.len(), 1);
    let p = &layout.placements[0];
    assert_eq!(p.pass, Pass::RatioMatch);
    assert!(p.scaled.0 <= 200 && p.scaled.1 <= 100);
    assert!(p.scaled.0 < 500 && p.scaled.1 < 400);
    assert_eq!(p.scaled, (125, 100));
}

#[test]
fn leftovers_are_dropped_once_regions_run_out() {
    let cfg = PackerConfig::builder().with_canvas(100, 100).build();
    let layout =
        pack_layout(vec![("a", 1000, 1000), ("b", 1000, 1000), ("c", 1000, 1000)], cfg)
            .expect("layout");
    assert_eq!(layout.placements.len(), 1);
    assert_eq!(layout.placements[0].frame, Rect::new(0, 0, 100, 100));
    assert_eq!(layout.dropped, vec!["b".to_string(), "c".to_string()]);
    assert_eq!(layout.stats().num_dropped, 2);
}

#[test]
fn engine_stops_only_when_one_side_is_empty() {
    for seed in 0..16u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let sizes: Vec<(String, u32, u32)> = (0..rng.gen_range(5..60))
            .map(|i| {
                (
                    format!("k{i}"),
                    rng.gen_range(8..=400),
                    rng.gen_range(8..=400),
                )
            })
            .collect();
        let cfg = PackerConfig::builder()
            .with_canvas(rng.gen_range(120..=800), rng.gen_range(120..=600))
            .build();
        let canvas = Rect::new(0, 0, cfg.canvas_width, cfg.canvas_height);
        let mut engine = PlacementEngine::new(&cfg, catalog(&sizes)).expect("engine");
        let placed: Vec<Placement> = engine.by_ref().collect();

        assert_eq!(engine.stage(), Stage::Done);
        assert!(
            engine.partitions().is_empty() || engine.remaining().is_empty(),
            "seed {seed}: regions and items both left over"
        );
        assert_eq!(placed.len() + engine.remaining().len(), sizes.len());

        let mut used = 0u64;
        for (i, a) in placed.iter().enumerate() {
            assert!(canvas.contains(&a.frame), "seed {seed}: {:?} off canvas", a.frame);
            assert!(a.region.contains(&a.frame));
            for b in &placed[i + 1..] {
                assert!(!a.frame.intersects(&b.frame), "seed {seed}: {} overlaps {}", a.key, b.key);
            }
            used += a.frame.area();
        }
        for r in engine.partitions().regions() {
            for p in &placed {
                assert!(!r.to_rect().intersects(&p.frame), "seed {seed}: free region overlaps {}", p.key);
            }
        }
        assert!(used + engine.partitions().free_area() <= canvas.area());
    }
}

#[test]
fn ratio_pass_serves_largest_region_first() {
    // 10x10 fills pass 1; the 500x500 goes to the largest leftover (the 190x200 strip)
    let cfg = PackerConfig::builder().with_canvas(200, 200).build();
    let layout = pack_layout(vec![("small", 10, 10), ("large", 500, 500)], cfg).expect("layout");
    let large = layout
        .placements
        .iter()
        .find(|p| p.key == "large")
        .expect("placed");
    assert_eq!(large.pass, Pass::RatioMatch);
    assert_eq!(large.region, Rect::new(10, 0, 190, 200));
    assert_eq!(large.frame, Rect::new(10, 0, 190, 190));
}
