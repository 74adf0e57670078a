use std::io::Write;

use contagion_sim::prelude::*;
use contagion_sim::{ContagionType, Series};

fn parameters(seed: u64, contagions: Vec<ContagionType>) -> ModelParameters {
    ModelParameters {
        seed,
        contagions,
        ..ModelParameters::default()
    }
}

fn all_series(model: &Model) -> &Series {
    model.series(SeriesKey::All).unwrap()
}

fn first_person(model: &Model) -> PersonId {
    model.people()[0].id()
}

#[test]
fn outbreak_with_permanent_immunity_burns_out() {
    let measles = ContagionType::new("measles", 8.0, 2.0, 0.3, 0.0);
    let mut model = Model::new(&parameters(7, vec![measles])).unwrap();
    let measles = model.contagion_id("measles").unwrap();
    assert_eq!(model.seed_infection(measles, 1), 1);

    model.run(1000);
    assert_eq!(model.snapshot().total_active(), 0);
    assert_eq!(model.pending_events(), 0);
    assert!(model.people().iter().all(|p| !p.is_infected()));

    // Everyone who ever caught it is still immune.
    let immune = model
        .people()
        .iter()
        .filter(|p| p.is_immune_to(measles))
        .count();
    assert!(immune >= 1);
    assert!(model.max_active_count() >= 1);
}

#[test]
fn every_row_is_one_tick() {
    let mut model = Model::new(&ModelParameters::default()).unwrap();
    let covid = model.contagion_id("COVID").unwrap();
    model.seed_infection(covid, 1);
    let snapshot = model.run(50);
    assert_eq!(snapshot.tick, 49);
    assert_eq!(model.now(), 50);

    // One initial row plus one per update, in every series.
    for key in model.series_keys() {
        assert_eq!(model.series(key).unwrap().len(), 51);
    }
    let keys: Vec<SeriesKey> = model.series_keys().collect();
    assert_eq!(keys, vec![SeriesKey::All, SeriesKey::Contagion(covid)]);
}

#[test]
fn isolated_people_never_transmit() {
    let positions = (0..10)
        .map(|i| Position::new(f64::from(i) * 10.0 - 45.0, 0.0))
        .collect();
    let plague = ContagionType::new("plague", 5.0, 0.0, 1.0, 0.0);
    let parameters = ModelParameters {
        half_width: 50.0,
        ..parameters(1, vec![plague])
    };
    let mut model = Model::from_positions(&parameters, positions).unwrap();
    let plague = model.contagion_id("plague").unwrap();
    let person = first_person(&model);
    model.infect_with(person, plague);
    model.run(20);

    let ever_infected = model
        .people()
        .iter()
        .filter(|p| p.is_immune_to(plague))
        .count();
    assert_eq!(ever_infected, 1);
    assert_eq!(all_series(&model).active_count().iter().max(), Some(&1));
}

#[test]
fn certain_transmission_reaches_the_whole_cluster() {
    let positions = vec![
        Position::new(0.0, 0.0),
        Position::new(3.0, 0.0),
        Position::new(6.0, 0.0),
        Position::new(9.0, 0.0),
    ];
    let plague = ContagionType::new("plague", 4.0, 0.0, 1.0, 0.0);
    let mut model = Model::from_positions(&parameters(3, vec![plague]), positions).unwrap();
    let plague = model.contagion_id("plague").unwrap();
    let person = first_person(&model);
    model.infect_with(person, plague);
    model.run(40);

    assert!(model.people().iter().all(|p| p.is_immune_to(plague)));
    assert_eq!(model.pending_events(), 0);
}

#[test]
fn waning_immunity_allows_reinfection() {
    let cold = ContagionType::new("cold", 3.0, 0.0, 0.0, 1.0);
    let mut model =
        Model::from_positions(&parameters(5, vec![cold]), vec![Position::ORIGIN]).unwrap();
    let cold = model.contagion_id("cold").unwrap();
    let person = first_person(&model);
    assert!(model.infect_with(person, cold));

    // Cured at tick 3, susceptible again at tick 4.
    model.run(5);
    assert!(!model.person(person).is_infected());
    assert!(!model.person(person).is_immune_to(cold));

    assert!(model.infect_with(person, cold));
    let snapshot = model.advance_tick();
    assert_eq!(snapshot.total_active(), 1);
    assert_eq!(all_series(&model).active_count(), &[1, 1, 1, 1, 0, 1, 1]);
}

#[test]
fn random_walk_keeps_index_consistent() {
    let parameters = ModelParameters {
        population: 200,
        movement: MovementConfig::RandomWalk { step_std_dev: 1.5 },
        ..parameters(11, vec![ContagionType::covid()])
    };
    let mut model = Model::new(&parameters).unwrap();
    let covid = model.contagion_id("COVID").unwrap();
    model.seed_infection(covid, 3);
    model.run(30);

    let range = model.neighbor_range();
    for person in model.people() {
        let mut expected: Vec<PersonId> = model
            .people()
            .iter()
            .filter(|other| other.position().distance(person.position()) < range)
            .map(contagion_sim::Person::id)
            .collect();
        expected.sort();
        let mut found = model.query_radius(person.position(), range);
        found.sort();
        assert_eq!(found, expected);
    }
}

#[test]
fn parameters_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "seed": 3,
            "population": 50,
            "contagions": [
                {{
                    "name": "flu",
                    "mean_duration": 5.0,
                    "duration_std_dev": 1.0,
                    "transmission_probability": 0.05,
                    "immunity_loss_probability": 0.1
                }}
            ],
            "reproduction_accounting": "on_cure"
        }}"#
    )
    .unwrap();

    let parameters = ModelParameters::load_from_json(file.path()).unwrap();
    assert_eq!(
        parameters.reproduction_accounting,
        ReproductionAccounting::OnCure
    );
    let mut model = Model::new(&parameters).unwrap();
    assert_eq!(model.population(), 50);
    let flu = model.contagion_id("flu").unwrap();
    model.seed_infection(flu, 2);
    let snapshot = model.run(30);
    assert!(snapshot.get(SeriesKey::Contagion(flu)).is_some());
}
