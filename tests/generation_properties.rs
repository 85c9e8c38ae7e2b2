use std::collections::{BTreeSet, HashMap, HashSet};

use rand::rngs::StdRng;
use rand::SeedableRng;

use school_timetable::schedule::policy::{ceremonial_subject, ceremonial_teacher};
use school_timetable::schedule::{
    Assignment, Day, GenerationInputs, Period, PeriodGrid, PeriodKind, PlanSession, SchoolClass,
    Scheduler, Subject, TeacherRef, TeacherRoster, FRIDAY,
};
use school_timetable::{GenerationConfig, TimetableError};

const SEEDS: [u64; 6] = [1, 7, 19, 42, 1234, 98765];

fn subject(id: &str, name: &str, code: &str, category: Option<&str>) -> Subject {
    Subject {
        id: id.into(),
        name: name.into(),
        code: code.into(),
        category: category.map(str::to_string),
    }
}

fn teacher(id: &str) -> TeacherRef {
    TeacherRef { id: id.into(), display_name: id.trim_start_matches("t-").to_string() }
}

/// Mon-Fri, lessons 1-6, lunch at 7, lessons 8-9
fn weekly_grid() -> PeriodGrid {
    let mut periods = Vec::new();
    for index in 1..=9u32 {
        let kind = if index == 7 { PeriodKind::Lunch } else { PeriodKind::Lesson };
        periods.push(Period {
            index,
            kind,
            start: format!("{:02}:00", 6 + index),
            end: format!("{:02}:45", 6 + index),
        });
    }
    PeriodGrid::new(periods, vec![1, 2, 3, 4, 5]).unwrap()
}

fn school() -> GenerationInputs {
    let catalogue = vec![
        subject("mat", "Mathematics", "MAT", None),
        subject("eng", "English", "ENG", Some("Language")),
        subject("ind", "Bahasa Indonesia", "IND", Some("Language")),
        subject("phy", "Physics", "PHY", Some("Science")),
        subject("bio", "Biology", "BIO", Some("Science")),
        subject("art", "Art", "ART", None),
        subject("pjok", "Sport", "PJOK", None),
        subject("ppi", "Flag Ceremony", "P.P.I", None),
    ];

    let homerooms = [("7A", "t-wati"), ("7B", "t-yanto"), ("8A", "t-zul")];
    let mut classes = Vec::new();
    let mut roster = TeacherRoster::new();
    for (class_id, homeroom) in homerooms {
        classes.push(SchoolClass {
            id: class_id.into(),
            name: format!("Class {}", class_id),
            grade: class_id[..1].to_string(),
            subjects: catalogue.clone(),
            class_teacher: Some(teacher(homeroom)),
        });
        let math_teacher = if class_id == "8A" { "t-dewi" } else { "t-budi" };
        roster.assign(class_id, "mat", teacher(math_teacher));
        roster.assign(class_id, "eng", teacher("t-sari"));
        roster.assign(class_id, "ind", teacher(homeroom));
        roster.assign(class_id, "phy", teacher("t-hadi"));
        roster.assign(class_id, "bio", teacher(&format!("t-bio-{}", class_id)));
        // art and sport have no teacher on record
    }

    GenerationInputs::new(weekly_grid(), classes, roster)
}

fn config() -> GenerationConfig {
    GenerationConfig {
        priority_subject_ids: ["eng".to_string()].into_iter().collect(),
        keyword: "math".into(),
        max_teacher_lessons_per_day: 5,
    }
}

fn class<'a>(inputs: &'a GenerationInputs, class_id: &str) -> &'a SchoolClass {
    inputs.classes.iter().find(|c| c.id == class_id).unwrap()
}

/// Teacher holding a placed cell, the same way the scheduler books them
fn cell_teacher(inputs: &GenerationInputs, class_id: &str, subject_id: &str) -> Option<String> {
    let class = class(inputs, class_id);
    let subject = class.subject(subject_id).unwrap();
    if ceremonial_subject(class).map(|s| s.id == subject.id).unwrap_or(false) {
        return ceremonial_teacher(class, subject, &inputs.roster).map(|t| t.id.clone());
    }
    inputs.roster.teacher_for(class_id, subject_id).map(|t| t.id.clone())
}

fn generate(seed: u64) -> (GenerationInputs, Assignment) {
    let inputs = school();
    let config = config();
    let mut rng = StdRng::seed_from_u64(seed);
    let (assignment, _) = Scheduler::new(&inputs, &config).run(&mut rng).unwrap();
    (inputs, assignment)
}

#[test]
fn no_teacher_is_double_booked() {
    for seed in SEEDS {
        let (inputs, assignment) = generate(seed);
        let mut seen: HashSet<(Day, u32, String)> = HashSet::new();
        for (key, placed) in assignment.iter() {
            if let Some(teacher) = cell_teacher(&inputs, &key.class_id, &placed.subject_id) {
                assert!(
                    seen.insert((key.day, key.period_index, teacher.clone())),
                    "seed {}: {} double-booked on day {} period {}",
                    seed,
                    teacher,
                    key.day,
                    key.period_index
                );
            }
        }
    }
}

#[test]
fn daily_teacher_cap_holds() {
    for seed in SEEDS {
        let (inputs, assignment) = generate(seed);
        let mut load: HashMap<(Day, String), u32> = HashMap::new();
        for (key, placed) in assignment.iter() {
            if let Some(teacher) = cell_teacher(&inputs, &key.class_id, &placed.subject_id) {
                *load.entry((key.day, teacher)).or_insert(0) += 1;
            }
        }
        for ((day, teacher), count) in load {
            assert!(count <= 5, "seed {}: {} has {} lessons on day {}", seed, teacher, count, day);
        }
    }
}

#[test]
fn consecutive_lessons_never_repeat_subject_or_category() {
    for seed in SEEDS {
        let (inputs, assignment) = generate(seed);
        let periods = inputs.grid.periods();
        for class in &inputs.classes {
            for &day in inputs.grid.active_days() {
                for pair in periods.windows(2) {
                    if !(pair[0].is_lesson() && pair[1].is_lesson()) {
                        continue;
                    }
                    let (Some(first), Some(second)) = (
                        assignment.get(day, &class.id, pair[0].index),
                        assignment.get(day, &class.id, pair[1].index),
                    ) else {
                        continue;
                    };
                    assert_ne!(first.subject_id, second.subject_id, "seed {} class {} day {}", seed, class.id, day);
                    let a = class.subject(&first.subject_id).unwrap().category_key();
                    let b = class.subject(&second.subject_id).unwrap().category_key();
                    if a.is_some() && b.is_some() {
                        assert_ne!(a, b, "seed {} class {} day {}", seed, class.id, day);
                    }
                }
            }
        }
    }
}

#[test]
fn ceremonial_subject_sits_only_on_friday_first_lesson() {
    for seed in SEEDS {
        let (inputs, assignment) = generate(seed);
        for class in &inputs.classes {
            let cells: Vec<(Day, u32)> = assignment
                .iter()
                .filter(|(key, placed)| key.class_id == class.id && placed.subject_id == "ppi")
                .map(|(key, _)| (key.day, key.period_index))
                .collect();
            assert_eq!(cells, vec![(FRIDAY, 1)], "seed {} class {}", seed, class.id);
        }
    }
}

#[test]
fn keyword_subject_stays_in_the_morning() {
    let morning: BTreeSet<u32> = (1..=6).collect();
    for seed in SEEDS {
        let (_, assignment) = generate(seed);
        for (key, placed) in assignment.iter() {
            if placed.subject_id == "mat" {
                assert!(morning.contains(&key.period_index), "seed {}: math at {:?}", seed, key);
            }
        }
    }
}

#[test]
fn every_class_gets_a_priority_subject_each_day() {
    for seed in SEEDS {
        let (inputs, assignment) = generate(seed);
        for class in &inputs.classes {
            for &day in inputs.grid.active_days() {
                let has_priority = assignment
                    .day_of_class(day, &class.id)
                    .any(|(_, placed)| placed.subject_id == "mat" || placed.subject_id == "eng");
                assert!(has_priority, "seed {} class {} day {}", seed, class.id, day);
            }
        }
    }
}

#[test]
fn only_lesson_periods_are_assigned() {
    let (_, assignment) = generate(3);
    assert!(assignment.iter().all(|(key, _)| key.period_index != 7));
    assert!(assignment.len() <= 5 * 8 * 3);
}

#[test]
fn without_friday_the_ceremonial_subject_is_not_scheduled() {
    let mut inputs = school();
    inputs.grid = PeriodGrid::new(weekly_grid().periods().to_vec(), vec![1, 2, 3, 4]).unwrap();
    let config = config();
    let mut rng = StdRng::seed_from_u64(4);
    let (assignment, report) = Scheduler::new(&inputs, &config).run(&mut rng).unwrap();

    assert_eq!(report.pinned_cells, 0);
    assert!(assignment.iter().all(|(_, placed)| placed.subject_id != "ppi"));
}

#[test]
fn template_without_lessons_has_nothing_to_generate() {
    let mut inputs = school();
    inputs.grid = PeriodGrid::new(
        vec![Period {
            index: 1,
            kind: PeriodKind::Break,
            start: "10:00".into(),
            end: "10:15".into(),
        }],
        vec![1, 2, 3, 4, 5],
    )
    .unwrap();

    let mut session = PlanSession::new("term-1");
    let mut rng = StdRng::seed_from_u64(1);
    let err = session.generate(&inputs, &config(), &mut rng).unwrap_err();
    assert!(matches!(err, TimetableError::NothingToGenerate(_)));
    assert!(!session.has_backup());
}

#[test]
fn snapshot_generate_revert_restores_previous_plan() {
    let inputs = school();
    let mut session = PlanSession::new("term-1");
    let mut rng = StdRng::seed_from_u64(77);

    session.generate(&inputs, &config(), &mut rng).unwrap();
    let first = session.current().clone();

    session.generate(&inputs, &config(), &mut rng).unwrap();
    assert!(session.revert());
    assert_eq!(session.current(), &first);

    // only one level is kept
    assert!(!session.revert());
    assert_eq!(session.current(), &first);
}

#[test]
fn report_counts_match_the_assignment() {
    let inputs = school();
    let config = config();
    let mut rng = StdRng::seed_from_u64(31);
    let (assignment, report) = Scheduler::new(&inputs, &config).run(&mut rng).unwrap();

    assert_eq!(report.total_cells, 5 * 8 * 3);
    assert_eq!(report.filled_cells, assignment.len());
    assert_eq!(report.filled_cells + report.unfilled_cells, report.total_cells);
    assert_eq!(report.pinned_cells, 3);
    assert_eq!(report.unfilled_by_class.values().sum::<usize>(), report.unfilled_cells);
}
