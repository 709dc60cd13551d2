//! The genre scoring table
//!
//! Five independent feature bands (each contributes exactly one row of votes)
//! followed by combinational bonuses which all fire when their conditions hold.
//! Thresholds and comparison operators are part of the contract: tempo bands
//! use `>=`, every other band uses strict `>`.

use super::{Genre, GenreScores};
use crate::features::FeatureVector;

use Genre::{Blues, Classical, Country, Electronic, HipHop, Jazz, Pop, Rock};

type Votes = &'static [(Genre, i32)];

/// Run every rule against the features
pub fn score(features: &FeatureVector) -> GenreScores {
    let mut scores = GenreScores::new();

    let bands = [
        tempo_votes(features.tempo),
        centroid_votes(features.spectral_centroid_mean),
        harmonic_votes(features.harmonic_ratio),
        zcr_votes(features.zero_crossing_rate_mean),
        rms_votes(features.rms_mean),
    ];
    for &(genre, points) in bands.iter().copied().flatten() {
        scores.add(genre, points);
    }

    for (genre, points) in bonuses(features) {
        scores.add(genre, points);
    }

    scores
}

/// Tempo band (BPM), first match wins
pub fn tempo_votes(tempo: f64) -> Votes {
    if tempo >= 140.0 {
        &[(Electronic, 4), (Rock, 2)]
    } else if tempo >= 125.0 {
        &[(Electronic, 3), (Rock, 3), (Pop, 2)]
    } else if tempo >= 100.0 {
        &[(Rock, 4), (Pop, 3), (Electronic, 1)]
    } else if tempo >= 85.0 {
        &[(Pop, 3), (HipHop, 4), (Rock, 2)]
    } else if tempo >= 70.0 {
        &[(HipHop, 3), (Jazz, 2), (Pop, 1)]
    } else {
        &[(Classical, 3), (Jazz, 3), (Blues, 2), (Country, 1)]
    }
}

/// Spectral centroid band (Hz)
pub fn centroid_votes(centroid: f64) -> Votes {
    if centroid > 2500.0 {
        &[(Electronic, 4), (Pop, 1)]
    } else if centroid > 2000.0 {
        &[(Electronic, 3), (Pop, 2), (Rock, 1)]
    } else if centroid > 1500.0 {
        &[(Rock, 3), (Pop, 2), (Electronic, 1)]
    } else if centroid > 1000.0 {
        &[(Pop, 2), (Rock, 1), (Jazz, 1), (HipHop, 1)]
    } else {
        &[(Classical, 4), (Jazz, 2), (Blues, 2), (Country, 2)]
    }
}

/// Harmonic ratio band
pub fn harmonic_votes(ratio: f64) -> Votes {
    if ratio > 0.8 {
        &[(Classical, 4), (Jazz, 3), (Blues, 2)]
    } else if ratio > 0.6 {
        &[(Classical, 2), (Jazz, 3), (Blues, 2), (Country, 1)]
    } else if ratio > 0.4 {
        &[(Rock, 2), (Pop, 2), (Jazz, 1), (HipHop, 1)]
    } else {
        &[(Electronic, 3), (HipHop, 1), (Rock, 1)]
    }
}

/// Zero-crossing-rate band
pub fn zcr_votes(zcr: f64) -> Votes {
    if zcr > 0.15 {
        &[(Rock, 3), (Electronic, 2), (HipHop, 1)]
    } else if zcr > 0.08 {
        &[(Rock, 2), (Pop, 2), (Electronic, 1), (HipHop, 1)]
    } else {
        &[(Classical, 2), (Jazz, 2), (Blues, 2), (Country, 1), (HipHop, 1)]
    }
}

/// RMS energy band
pub fn rms_votes(rms: f64) -> Votes {
    if rms > 0.1 {
        &[(Rock, 2), (Electronic, 1), (Pop, 1)]
    } else if rms > 0.05 {
        &[(Pop, 1), (HipHop, 2), (Electronic, 1)]
    } else {
        &[(Classical, 1), (Jazz, 1), (Blues, 1)]
    }
}

/// Cross-feature bonuses; every rule whose condition holds contributes
pub fn bonuses(features: &FeatureVector) -> Vec<(Genre, i32)> {
    let tempo = features.tempo;
    let centroid = features.spectral_centroid_mean;
    let harmonic = features.harmonic_ratio;
    let zcr = features.zero_crossing_rate_mean;
    let rms = features.rms_mean;
    let hip_hop_tempo = (80.0..=110.0).contains(&tempo);

    let rules = [
        (tempo >= 100.0 && rms > 0.08, Rock, 2),
        (tempo < 80.0 && harmonic > 0.7, Classical, 3),
        (centroid < 1000.0 && harmonic > 0.8, Classical, 2),
        (centroid > 2000.0 && harmonic < 0.5, Electronic, 3),
        (centroid > 2500.0 && harmonic < 0.4, Electronic, 2),
        (hip_hop_tempo && rms > 0.06, HipHop, 2),
        (hip_hop_tempo && zcr > 0.08, HipHop, 1),
        ((70.0..=120.0).contains(&tempo) && harmonic > 0.6, Jazz, 2),
    ];

    rules
        .into_iter()
        .filter(|(fires, _, _)| *fires)
        .map(|(_, genre, points)| (genre, points))
        .collect()
}
