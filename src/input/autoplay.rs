//! # Autoplay Module
//!
//! Automatic answers for every prompt, so a game can run without humans.

use crate::input::{GateHandle, PendingRequest, Prompt, Response};
use crate::BoardResult;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::mpsc;

/// Seeded bot that answers prompts.
#[derive(Debug, Clone)]
pub struct AutoPlayer {
    rng: StdRng,
    /// Chance that a task verdict is a success
    pub task_success_chance: f64,
    /// Pause before each answer
    pub answer_delay: Duration,
}

impl AutoPlayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            task_success_chance: 0.5,
            answer_delay: Duration::ZERO,
        }
    }

    /// Picks an answer for `request`.
    ///
    /// Directions and targets are chosen at random among the offered ones, every
    /// confirmation is accepted and dice are acknowledged.
    pub fn answer(&mut self, request: &PendingRequest) -> Response {
        match &request.prompt {
            Prompt::Direction { options, .. } => match options.choose(&mut self.rng) {
                Some(direction) => Response::Direction(*direction),
                None => Response::Acknowledged,
            },
            Prompt::Confirm { .. } => Response::Confirm(true),
            Prompt::Target { candidates, .. } => match candidates.choose(&mut self.rng) {
                Some(target) => Response::Target(*target),
                None => Response::Acknowledged,
            },
            Prompt::Dice { .. } => Response::Acknowledged,
            Prompt::Event { has_fail, .. } => {
                let success = !has_fail || self.rng.gen_bool(self.task_success_chance);
                Response::Verdict(success)
            }
        }
    }
}

/// Answers requests until the engine drops its gate.
///
/// Returns the number of requests answered.
pub async fn autoplay(
    handle: GateHandle,
    mut requests: mpsc::UnboundedReceiver<PendingRequest>,
    mut player: AutoPlayer,
) -> BoardResult<usize> {
    let mut answered = 0;
    while let Some(request) = requests.recv().await {
        if !player.answer_delay.is_zero() {
            tokio::time::sleep(player.answer_delay).await;
        }
        let response = player.answer(&request);
        handle.resolve(request.id, response)?;
        answered += 1;
    }
    log::debug!("Autoplay finished after {} answers", answered);
    Ok(answered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventCategory;
    use crate::game::Direction;
    use crate::input::input_channel;

    fn request(prompt: Prompt) -> PendingRequest {
        PendingRequest {
            id: 0,
            player: 1,
            prompt,
        }
    }

    #[test]
    fn test_answers_fit_prompts() {
        let mut bot = AutoPlayer::new(4);

        let options = vec![Direction::North, Direction::West];
        for _ in 0..20 {
            match bot.answer(&request(Prompt::Direction {
                text: String::new(),
                options: options.clone(),
            })) {
                Response::Direction(d) => assert!(options.contains(&d)),
                other => panic!("unexpected {:?}", other),
            }
        }

        let answer = bot.answer(&request(Prompt::Target {
            text: String::new(),
            candidates: vec![3],
        }));
        assert_eq!(answer, Response::Target(3));

        let answer = bot.answer(&request(Prompt::Confirm {
            text: String::new(),
        }));
        assert_eq!(answer, Response::Confirm(true));
    }

    #[test]
    fn test_task_success_chance_extremes() {
        let mut bot = AutoPlayer::new(4);
        let task = request(Prompt::Event {
            category: EventCategory::Task,
            title: String::new(),
            description: String::new(),
            has_fail: true,
        });

        bot.task_success_chance = 0.0;
        assert_eq!(bot.answer(&task), Response::Verdict(false));
        bot.task_success_chance = 1.0;
        assert_eq!(bot.answer(&task), Response::Verdict(true));
    }

    #[test]
    fn test_autoplay_stops_when_gate_dropped() {
        let (gate, handle, requests) = input_channel();
        drop(gate);
        let answered =
            tokio_test::block_on(autoplay(handle, requests, AutoPlayer::new(0))).unwrap();
        assert_eq!(answered, 0);
    }

    #[tokio::test]
    async fn test_autoplay_drives_gate() {
        let (mut gate, handle, requests) = input_channel();
        let bot = tokio::spawn(autoplay(handle, requests, AutoPlayer::new(1)));

        assert!(gate.confirm(1, "Teleport?").await.unwrap());
        gate.acknowledge_dice(1, vec![2], 2).await.unwrap();
        drop(gate);

        assert_eq!(bot.await.unwrap().unwrap(), 2);
    }
}
