#![no_main]
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;
use ph_core::Interpolator;

#[derive(Debug, Arbitrary)]
struct Input {
    points: Vec<(f32, f32)>,
    probes: Vec<f32>,
}

fuzz_target!(|input: Input| {
    let Ok((interp, _)) = Interpolator::new(input.points.iter().copied()) else {
        return;
    };
    let pts = interp.table().points();
    assert!(pts.windows(2).all(|w| w[0].voltage() <= w[1].voltage()));
    for p in pts {
        // the first point listed at a voltage answers for it
        let first = pts.iter().find(|q| q.voltage() == p.voltage()).map(|q| q.ph());
        assert_eq!(Some(interp.estimate(p.voltage())), first);
    }
    for v in input.probes {
        let _ = interp.estimate(v);
    }
});
