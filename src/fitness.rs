//! Scoring and picking the lead vehicle of a generation.

use crate::vehicle::Vehicle;

/// Index of the best vehicle: the highest score, ties broken by the smallest y
/// (furthest along the road), remaining ties by population order.
pub fn select_best(population: &[Vehicle]) -> Option<usize> {
    let top = population.iter().map(Vehicle::score).max()?;
    population
        .iter()
        .enumerate()
        .filter(|(_, v)| v.score() == top)
        .fold(None, |best: Option<(usize, f64)>, (idx, v)| match best {
            Some((_, y)) if y <= v.y() => best,
            _ => Some((idx, v.y())),
        })
        .map(|(idx, _)| idx)
}

/// Let every trainee credit every traffic vehicle it is ahead of
pub fn credit_overtakes(trainees: &mut [Vehicle], traffic: &[Vehicle]) {
    for trainee in trainees.iter_mut() {
        for other in traffic {
            trainee.credit_overtake(other);
        }
    }
}
