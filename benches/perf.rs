use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use oddsy_merge::matcher::{CandidateSet, MIN_MATCH_SCORE};
use oddsy_merge::normalize::normalize_team_name;
use oddsy_merge::reconcile::{ReconcileConfig, reconcile};
use oddsy_merge::records::{EventId, MackolikMatch, SofascoreMatch};

const CLUBS: &[&str] = &[
    "Galatasaray",
    "Fenerbahçe",
    "Beşiktaş",
    "Trabzonspor",
    "Başakşehir",
    "Kasımpaşa",
    "Gaziantep FK",
    "Kayserispor",
    "Sivasspor",
    "Rizespor",
    "Manchester United",
    "Manchester City",
    "Tottenham Hotspur",
    "Leeds United",
    "Sheffield United",
    "Sheffield Wednesday",
    "Real Madrid",
    "Atlético Madrid",
    "Real Sociedad",
    "Athletic Club",
    "Olympique Lyonnais",
    "Olympique de Marseille",
    "Paris Saint-Germain",
    "AS Roma",
    "SS Lazio",
    "AC Milan",
    "Inter",
    "Sporting CP",
    "FC Porto",
    "SL Benfica",
];

fn sofascore_day() -> Vec<SofascoreMatch> {
    (0..120)
        .map(|i| {
            let home = CLUBS[i % CLUBS.len()];
            let away = CLUBS[(i * 7 + 3) % CLUBS.len()];
            SofascoreMatch {
                event_id: Some(EventId::Number(10_000 + i as u64)),
                date_time: Some("2026-02-09 20:00:00".to_string()),
                country: None,
                league: Some(format!("League {}", i / 10)),
                home_team: format!("{home} {}", i / CLUBS.len()),
                away_team: format!("{away} {}", i / CLUBS.len()),
                home_win: Some(2.1),
                draw: Some(3.4),
                away_win: Some(3.2),
                over_2_5: None,
                under_2_5: None,
                over_3_5: None,
                under_3_5: None,
                btts_yes: None,
                btts_no: None,
            }
        })
        .collect()
}

fn mackolik_day(b: &[SofascoreMatch]) -> Vec<MackolikMatch> {
    b.iter()
        .map(|m| MackolikMatch {
            home_team: m.home_team.to_uppercase().replace(' ', "-"),
            away_team: m.away_team.replace("United", "Utd"),
            saat: "20:00".to_string(),
            kg_var: Some(1.7),
            ust_2_5: Some(1.8),
            ..Default::default()
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_team_name", |b| {
        b.iter(|| {
            for club in CLUBS {
                black_box(normalize_team_name(black_box(club)));
            }
        })
    });
}

fn bench_best_match(c: &mut Criterion) {
    let day = sofascore_day();
    let set = CandidateSet::new(day.iter().map(|m| m.home_team.as_str()));
    let query = normalize_team_name("Sheffield Utd 2");
    c.bench_function("candidate_best_match", |b| {
        b.iter(|| black_box(set.best_match(black_box(&query), MIN_MATCH_SCORE)))
    });
}

fn bench_reconcile_day(c: &mut Criterion) {
    let b_day = sofascore_day();
    let a_day = mackolik_day(&b_day);
    let cfg = ReconcileConfig::default();
    c.bench_function("reconcile_day_120", |b| {
        b.iter(|| {
            let out = reconcile(black_box(&a_day), black_box(&b_day), None, &cfg);
            black_box(out.merged.len());
        })
    });
}

criterion_group!(benches, bench_normalize, bench_best_match, bench_reconcile_day);
criterion_main!(benches);
