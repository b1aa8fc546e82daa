use gridtune::parameter::{CategoricalParam, IntParam, Parameter};
use gridtune::sampler::RandomSampler;
use gridtune::{Direction, Study, TrialState};

#[test]
fn ask_and_tell_round_trip() {
    let study = Study::with_sampler(Direction::Maximize, RandomSampler::with_seed(5));
    let n_layers = IntParam::new(1, 4).name("n_layers");

    for _ in 0..8 {
        let mut trial = study.ask();
        let layers = n_layers.suggest(&mut trial).unwrap();
        study.tell(trial, Ok::<_, &str>(layers as f64));
    }

    assert_eq!(study.n_trials(), 8);
    let best = study.best_trial().unwrap();
    assert_eq!(best.get(&n_layers), Some(best.value as i64));
}

#[test]
fn telling_an_error_drops_the_trial() {
    let study = Study::new(Direction::Minimize);
    let trial = study.ask();
    study.tell(trial, Err::<f64, _>("simulation crashed"));
    assert_eq!(study.n_trials(), 0);
}

#[test]
fn trial_ids_are_unique_and_increasing() {
    let study = Study::new(Direction::Minimize);
    let a = study.ask();
    let b = study.ask();
    assert!(a.id() < b.id());
}

#[test]
fn categorical_choices_survive_the_round_trip() {
    let study = Study::with_sampler(Direction::Minimize, RandomSampler::with_seed(11));
    let clip_range: CategoricalParam<f64> =
        CategoricalParam::new(vec![0.1, 0.2, 0.3]).name("clip_range");

    let mut trial = study.ask();
    let chosen = clip_range.suggest(&mut trial).unwrap();
    assert!([0.1, 0.2, 0.3].contains(&chosen));
    study.tell(trial, Ok::<_, &str>(0.0));

    let stored = study.trials()[0].get(&clip_range).unwrap();
    assert!((stored - chosen).abs() < f64::EPSILON);
    assert_eq!(study.trials()[0].state, TrialState::Complete);
}
