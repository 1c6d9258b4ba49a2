//! Contextual response generation
//!
//! Two phases: a pending question, if any, gets first claim on the
//! utterance; otherwise (or for an accepted "another joke?") the intent is
//! dispatched to its response rule.

use chrono::{Local, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

use super::{DialogueManager, Reply};
use crate::fallback::clean_response;
use crate::intent::Intent;
use crate::state::PendingQuestion;

impl<R: Rng> DialogueManager<R> {
    /// Produce the response to a classified utterance
    ///
    /// The caller is expected to [`record`](Self::record) the interaction
    /// afterwards. Never fails: every problem degrades to a catalog message.
    pub fn respond(&mut self, intent: Option<Intent>, utterance: &str, language: &str) -> Reply {
        let mut intent = intent;

        // An exit request always ends the conversation, whatever was asked
        if intent == Some(Intent::Exit) {
            self.state.clear_pending();
        }

        if let Some(pending) = self.state.take_pending() {
            tracing::debug!(pending = pending.tag(), ?intent, "resolving pending question");
            match pending {
                PendingQuestion::Name => return self.learn_name(intent, utterance, language),
                PendingQuestion::HowAreYou => return self.how_are_you_answer(intent, language),
                PendingQuestion::AnotherJoke => {
                    if matches!(intent, Some(Intent::Yes | Intent::Joke)) {
                        intent = Some(Intent::Joke);
                    } else {
                        let text = self.render("no_generic", language, &[]);
                        return reply(text, false, intent);
                    }
                }
                PendingQuestion::AnswerQuestion { question, .. } => {
                    let text = if question.is_correct(utterance) {
                        self.render("question_correct", language, &[])
                    } else {
                        self.render("question_incorrect", language, &[("answer", question.answer.as_str())])
                    };
                    tracing::debug!(prompt = %question.prompt, "trivia answered");
                    return reply(text, true, intent);
                }
            }
        }

        self.dispatch(intent, utterance, language)
    }

    /// Phase B: one response rule per intent
    fn dispatch(&mut self, intent: Option<Intent>, utterance: &str, language: &str) -> Reply {
        let Some(intent) = intent else {
            let text = self.unknown(utterance, language);
            return reply(text, false, None);
        };

        let p = self.config.probabilities;
        let repeated = self.history.count_intent(intent) > 1;

        let (text, follow_up) = match intent {
            Intent::Greeting => (self.greeting(repeated, language), false),
            Intent::HowAreYou => {
                let text = self.render("how_are_you", language, &[]);
                self.state.arm(PendingQuestion::HowAreYou);
                (text, false)
            }
            Intent::Time => {
                let now = Local::now().format("%I:%M %p").to_string();
                let key = if repeated { "time_repeat" } else { "time" };
                (self.render(key, language, &[("current_time", now.as_str())]), false)
            }
            Intent::Name => {
                let text = if repeated {
                    self.render("name_repeat", language, &[])
                } else if self.state.user_name().is_none() && self.chance(p.name_ask) {
                    self.state.arm(PendingQuestion::Name);
                    self.render("name_ask", language, &[])
                } else {
                    self.render("name", language, &[])
                };
                (text, false)
            }
            Intent::UserName => {
                let answer = self.learn_name(Some(intent), utterance, language);
                if self.state.user_name().is_none() {
                    self.state.arm(PendingQuestion::Name);
                }
                return answer;
            }
            Intent::Joke => (self.joke(language), false),
            Intent::Exit => {
                let text = match self.state.user_name().map(str::to_owned) {
                    Some(name) => self.render("goodbye_personalized", language, &[("name", name.as_str())]),
                    None => self.render("exit", language, &[]),
                };
                (text, false)
            }
            Intent::AskQuestion => (self.ask_trivia(language, Utc::now()), true),
            // Only reachable with no trivia question pending
            Intent::AnswerQuestion => (self.unknown(utterance, language), false),
            Intent::Yes => (self.render("yes_generic", language, &[]), false),
            Intent::No => (self.render("no_generic", language, &[]), false),
            Intent::Weather => (self.render("weather", language, &[]), false),
            Intent::Thanks
            | Intent::Capabilities
            | Intent::AboutYou
            | Intent::HowMade
            | Intent::WhatElse
            | Intent::Why => {
                // Small talk may lead into a follow-up question
                let text = self.render(intent.as_str(), language, &[]);
                (text, self.chance(p.small_talk_follow_up))
            }
        };

        reply(text, follow_up, Some(intent))
    }

    /// Store the user's name if the utterance carries one
    fn learn_name(&mut self, intent: Option<Intent>, utterance: &str, language: &str) -> Reply {
        let text = match self.names.extract(utterance, language) {
            Some(name) => {
                let text = self.render("user_name_confirm", language, &[("name", name.as_str())]);
                self.state.set_user_name(name);
                text
            }
            None => self.render("user_name_fail", language, &[]),
        };
        reply(text, false, intent)
    }

    fn how_are_you_answer(&mut self, intent: Option<Intent>, language: &str) -> Reply {
        match intent {
            Some(Intent::Greeting | Intent::HowAreYou | Intent::Yes) => {
                reply(self.render("how_are_you_resp_glad", language, &[]), false, intent)
            }
            Some(Intent::No) => {
                reply(self.render("how_are_you_resp_sorry", language, &[]), true, intent)
            }
            _ => reply(self.render("unknown", language, &[]), false, intent),
        }
    }

    fn greeting(&mut self, repeated: bool, language: &str) -> String {
        if repeated {
            return self.render("greeting_repeat", language, &[]);
        }

        let mut text = match self.state.user_name().map(str::to_owned) {
            Some(name) => self.render("greeting_personalized", language, &[("name", name.as_str())]),
            None => self.render("greeting", language, &[]),
        };

        let p = self.config.probabilities.greeting_how_are_you;
        if !self.state.how_are_you_asked() && self.chance(p) {
            let follow_up = self.render("greeting_followup", language, &[]);
            text.push(' ');
            text.push_str(&follow_up);
            self.state.arm(PendingQuestion::HowAreYou);
        }
        text
    }

    /// A joke not told within the history window
    fn joke(&mut self, language: &str) -> String {
        let told: Vec<&str> = self.history.responses_for(Intent::Joke).collect();
        let fresh: Vec<String> = self
            .catalog
            .alternatives("joke", language)
            .iter()
            .filter(|joke| !told.iter().any(|r| r.starts_with(joke.as_str())))
            .cloned()
            .collect();

        let Some(joke) = fresh.choose(&mut self.rng).cloned() else {
            tracing::debug!(told = told.len(), "out of jokes");
            return self.render("joke_out", language, &[]);
        };

        let mut text = joke;
        if self.chance(self.config.probabilities.joke_ask_more) {
            let more = self.render("joke_ask_more", language, &[]);
            text.push(' ');
            text.push_str(&more);
            self.state.arm(PendingQuestion::AnotherJoke);
        }
        text
    }

    /// Response for an utterance no intent matched
    fn unknown(&mut self, utterance: &str, language: &str) -> String {
        if let Some(fallback) = &self.fallback {
            let generated = fallback.respond(utterance, language);
            match generated.map(|text| clean_response(&text)) {
                Ok(text) if !text.is_empty() => return text,
                Ok(_) => tracing::warn!(language, "fallback returned an empty response"),
                Err(e) => tracing::warn!(language, error = %e, "fallback failed"),
            }
            return self.render("fallback_error", language, &[]);
        }

        let p = self.config.probabilities.unknown_personalized;
        match self.state.user_name().map(str::to_owned) {
            Some(name) if self.chance(p) => {
                self.render("unknown_personalized", language, &[("name", name.as_str())])
            }
            _ => self.render("unknown", language, &[]),
        }
    }
}

const fn reply(text: String, should_follow_up: bool, intent: Option<Intent>) -> Reply {
    Reply {
        text,
        should_follow_up,
        intent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::{DialogueConfig, Probabilities};
    use crate::trivia::TriviaQuestion;

    fn manager(p: f64) -> DialogueManager {
        let config = DialogueConfig {
            probabilities: Probabilities::uniform(p),
            seed: Some(11),
            ..DialogueConfig::default()
        };
        DialogueManager::new(config, Catalog::embedded("en").unwrap()).unwrap()
    }

    #[test]
    fn test_greeting_without_name() {
        let mut dm = manager(0.0);
        let reply = dm.respond(Some(Intent::Greeting), "hello", "en");
        let greetings = dm.catalog().alternatives("greeting", "en");
        assert!(greetings.contains(&reply.text));
        assert!(!reply.should_follow_up);
        assert!(!dm.state().expecting_response());
    }

    #[test]
    fn test_greeting_personalized() {
        let mut dm = manager(0.0);
        dm.state_mut().set_user_name("Alex");
        let reply = dm.respond(Some(Intent::Greeting), "hi", "en");
        assert!(reply.text.contains("Alex"), "{}", reply.text);
    }

    #[test]
    fn test_greeting_asks_how_are_you_once() {
        let mut dm = manager(1.0);
        let reply = dm.respond(Some(Intent::Greeting), "hello", "en");
        assert!(reply.text.ends_with(" How are you doing today?"));
        assert_eq!(dm.state().last_question(), Some("how_are_you"));

        dm.state_mut().clear_pending();
        let reply = dm.respond(Some(Intent::Greeting), "hello", "en");
        assert!(!reply.text.ends_with("How are you doing today?"));
        assert!(!dm.state().expecting_response());
    }

    #[test]
    fn test_how_are_you_answers() {
        let mut dm = manager(0.0);
        dm.state_mut().arm(PendingQuestion::HowAreYou);
        let reply = dm.respond(Some(Intent::Yes), "yes", "en");
        assert_eq!(reply.text, "That's wonderful to hear! What can I help you with today?");
        assert!(!reply.should_follow_up);

        dm.state_mut().arm(PendingQuestion::HowAreYou);
        let reply = dm.respond(Some(Intent::No), "not really", "en");
        assert!(reply.text.starts_with("I'm sorry to hear that."));
        assert!(reply.should_follow_up);

        dm.state_mut().arm(PendingQuestion::HowAreYou);
        let reply = dm.respond(Some(Intent::Weather), "is it raining", "en");
        assert!(dm.catalog().alternatives("unknown", "en").contains(&reply.text));
        assert!(!dm.state().expecting_response());
    }

    #[test]
    fn test_name_question_armed_with_certainty() {
        let mut dm = manager(1.0);
        let reply = dm.respond(Some(Intent::Name), "what's your name", "en");
        assert!(reply.text.ends_with("What should I call you?"));
        assert_eq!(dm.state().last_question(), Some("name"));
    }

    #[test]
    fn test_name_states_own_name_when_user_known() {
        let mut dm = manager(1.0);
        dm.state_mut().set_user_name("Alex");
        let reply = dm.respond(Some(Intent::Name), "who are you", "en");
        assert_eq!(
            reply.text,
            "I'm Shadow, your AI assistant. I'm here to help and chat with you."
        );
    }

    #[test]
    fn test_pending_name_failure() {
        let mut dm = manager(0.0);
        dm.state_mut().arm(PendingQuestion::Name);
        let reply = dm.respond(None, "pizza", "en");
        assert_eq!(reply.text, "I didn't quite catch your name. Could you tell me again?");
        assert!(!dm.state().expecting_response());
        assert!(dm.state().user_name().is_none());
    }

    #[test]
    fn test_user_name_failure_asks_again() {
        let mut dm = manager(0.0);
        let reply = dm.respond(Some(Intent::UserName), "my name is", "en");
        assert_eq!(reply.text, "I didn't quite catch your name. Could you tell me again?");
        assert_eq!(dm.state().last_question(), Some("name"));
    }

    #[test]
    fn test_another_joke_declined() {
        let mut dm = manager(0.0);
        dm.state_mut().arm(PendingQuestion::AnotherJoke);
        let reply = dm.respond(Some(Intent::No), "no", "en");
        assert_eq!(reply.text, "Alright. Is there something else you'd like to talk about?");
        assert_eq!(reply.intent, Some(Intent::No));
    }

    #[test]
    fn test_another_joke_accepted() {
        let mut dm = manager(0.0);
        dm.state_mut().arm(PendingQuestion::AnotherJoke);
        let reply = dm.respond(Some(Intent::Yes), "yes", "en");
        assert_eq!(reply.intent, Some(Intent::Joke));
        assert!(dm.catalog().alternatives("joke", "en").contains(&reply.text));
    }

    #[test]
    fn test_joke_offers_another() {
        let mut dm = manager(1.0);
        let reply = dm.respond(Some(Intent::Joke), "tell me a joke", "en");
        assert!(reply.text.ends_with(" Would you like to hear another one?"));
        assert_eq!(dm.state().last_question(), Some("another_joke"));
    }

    #[test]
    fn test_trivia_incorrect_reveals_answer() {
        let mut dm = manager(0.0);
        dm.state_mut().arm(PendingQuestion::AnswerQuestion {
            question: TriviaQuestion::new("How many continents are there?", "7", 10),
            asked_at: Utc::now(),
        });
        let reply = dm.respond(None, "five", "en");
        assert!(reply.text.contains('7'), "{}", reply.text);
        assert!(reply.should_follow_up);
        assert!(dm.state().current_question().is_none());
    }

    #[test]
    fn test_answer_without_question_is_unknown() {
        let mut dm = manager(0.0);
        let reply = dm.respond(Some(Intent::AnswerQuestion), "it's paris", "en");
        assert!(dm.catalog().alternatives("unknown", "en").contains(&reply.text));
    }

    #[test]
    fn test_exit_overrides_pending_question() {
        let mut dm = manager(0.0);
        dm.state_mut().arm(PendingQuestion::Name);
        let reply = dm.respond(Some(Intent::Exit), "goodbye", "en");
        assert!(dm.catalog().alternatives("exit", "en").contains(&reply.text));
        assert!(!dm.state().expecting_response());
    }

    #[test]
    fn test_personalized_goodbye() {
        let mut dm = manager(0.0);
        dm.state_mut().set_user_name("Alex");
        let reply = dm.respond(Some(Intent::Exit), "bye", "en");
        assert_eq!(reply.text, "Goodbye, Alex! Have a wonderful day!");
        assert!(!reply.should_follow_up);
    }

    #[test]
    fn test_small_talk_follow_up_probability() {
        let mut dm = manager(1.0);
        let reply = dm.respond(Some(Intent::Thanks), "thanks", "en");
        assert!(reply.should_follow_up);

        let mut dm = manager(0.0);
        let reply = dm.respond(Some(Intent::Thanks), "thanks", "en");
        assert!(!reply.should_follow_up);
        assert!(dm.catalog().alternatives("thanks", "en").contains(&reply.text));
    }

    #[test]
    fn test_bare_yes_and_no() {
        let mut dm = manager(0.0);
        let reply = dm.respond(Some(Intent::Yes), "yes", "en");
        assert_eq!(reply.text, "Great! What would you like to discuss?");
        let reply = dm.respond(Some(Intent::No), "no", "en");
        assert_eq!(reply.text, "Alright. Is there something else you'd like to talk about?");
    }

    #[test]
    fn test_unknown_personalized() {
        let mut dm = manager(1.0);
        dm.state_mut().set_user_name("Alex");
        let reply = dm.respond(None, "zzzq", "en");
        assert_eq!(reply.text, "I'm sorry, Alex, I didn't quite catch that. Could you rephrase it?");
        assert!(reply.intent.is_none());
    }

    #[test]
    fn test_fallback_used_for_unknown() {
        let mut dm = manager(0.0).with_fallback(|utterance: &str, _: &str| -> crate::Result<String> {
            Ok(format!("**Generated** answer to {utterance}"))
        });
        let reply = dm.respond(None, "what is rust", "en");
        assert_eq!(reply.text, "Generated answer to what is rust");
    }

    #[test]
    fn test_fallback_failure_renders_error() {
        let mut dm = manager(0.0).with_fallback(|_: &str, _: &str| -> crate::Result<String> {
            Err(crate::Error::Fallback("offline".to_string()))
        });
        let reply = dm.respond(None, "what is rust", "en");
        assert_eq!(
            reply.text,
            "I couldn't connect to my knowledge base right now. Could you try asking something else?"
        );

        let mut dm = manager(0.0).with_fallback(|_: &str, _: &str| -> crate::Result<String> {
            Ok("  ## ".to_string())
        });
        let reply = dm.respond(None, "what is rust", "en");
        assert!(reply.text.starts_with("I couldn't connect"));
    }
}
