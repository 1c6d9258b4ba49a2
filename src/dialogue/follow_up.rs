//! Proactive questions and trivia timeouts

use chrono::{DateTime, Utc};
use rand::Rng;

use super::DialogueManager;
use crate::state::PendingQuestion;
use crate::trivia;

impl<R: Rng> DialogueManager<R> {
    /// Maybe ask a proactive question
    ///
    /// Call only when a reply signaled `should_follow_up`. Triggers are tried
    /// in order (ask the user's name, ask how they are once the session is
    /// old enough, pose a trivia question) and the first that fires arms its
    /// pending question. Nothing is asked while another question is pending.
    pub fn maybe_follow_up(&mut self, language: &str) -> Option<String> {
        self.maybe_follow_up_at(language, Utc::now())
    }

    /// [`maybe_follow_up`](Self::maybe_follow_up) with an explicit clock
    pub fn maybe_follow_up_at(&mut self, language: &str, now: DateTime<Utc>) -> Option<String> {
        if self.state.expecting_response() {
            tracing::debug!(
                pending = self.state.last_question(),
                "question already pending, no follow-up"
            );
            return None;
        }

        let p = self.config.probabilities;

        if self.state.user_name().is_none() && self.chance(p.follow_up_name) {
            self.state.arm(PendingQuestion::Name);
            return Some(self.render("followup_name", language, &[]));
        }

        let idle = i64::try_from(self.config.idle_threshold_secs).unwrap_or(i64::MAX);
        if self.state.session_elapsed_secs(now) > idle
            && !self.state.how_are_you_asked()
            && self.chance(p.follow_up_how_are_you)
        {
            self.state.arm(PendingQuestion::HowAreYou);
            return Some(self.render("followup_how_are_you", language, &[]));
        }

        if self.chance(p.follow_up_trivia) {
            return Some(self.ask_trivia(language, now));
        }

        None
    }

    /// Pose a random trivia question and await its answer
    pub(super) fn ask_trivia(&mut self, language: &str, now: DateTime<Utc>) -> String {
        let Some(question) = trivia::pick(&self.config.trivia, &mut self.rng).cloned() else {
            tracing::warn!("trivia bank is empty");
            return self.render("unknown", language, &[]);
        };

        let text = self.render("ask_question", language, &[("question", question.prompt.as_str())]);
        self.state.arm(PendingQuestion::AnswerQuestion {
            question,
            asked_at: now,
        });
        text
    }

    /// Give up on a trivia question left unanswered too long
    ///
    /// Returns the rendered timeout message (with the answer) and clears the
    /// pending question if its time ran out by `now`.
    pub fn expire_question(&mut self, now: DateTime<Utc>, language: &str) -> Option<String> {
        let question = self.state.current_question()?;
        let asked_at = self.state.question_start_time()?;
        let timeout = i64::try_from(question.timeout_secs).unwrap_or(i64::MAX);

        if (now - asked_at).num_seconds() <= timeout {
            return None;
        }

        let answer = question.answer.clone();
        tracing::debug!(prompt = %question.prompt, "trivia question timed out");
        self.state.clear_pending();
        Some(self.render("question_timeout", language, &[("answer", answer.as_str())]))
    }
}
