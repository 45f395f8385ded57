//! Turn-input parser
//!
//! One turn is a whitespace-separated token stream:
//!
//! ```text
//! ax ay
//! n
//! id x y          (n target lines)
//! m
//! id x y health   (m hostile lines)
//! ```
//!
//! Line breaks carry no meaning; only token order does.

use std::collections::VecDeque;
use std::io::BufRead;
use std::str::FromStr;

use crate::core::error::{Result, VigilError};
use crate::spatial::Point;
use crate::world::{EntityId, Hostile, Target, World};

pub struct TurnReader<R> {
    input: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> TurnReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            pending: VecDeque::new(),
        }
    }

    /// Read the next turn
    ///
    /// Returns `Ok(None)` when the input ends cleanly before a turn starts.
    pub fn read_turn(&mut self) -> Result<Option<World>> {
        let Some(first) = self.next_token()? else {
            return Ok(None);
        };
        let ax = parse_token("agent x", &first)?;
        let ay = self.number("agent y")?;

        let target_count = self.count("target")?;
        let mut targets = Vec::with_capacity(target_count);
        for _ in 0..target_count {
            let id: EntityId = self.number("target id")?;
            let x = self.number("target x")?;
            let y = self.number("target y")?;
            targets.push(Target {
                id,
                pos: Point::new(x, y),
            });
        }

        let hostile_count = self.count("hostile")?;
        let mut hostiles = Vec::with_capacity(hostile_count);
        for _ in 0..hostile_count {
            let id: EntityId = self.number("hostile id")?;
            let x = self.number("hostile x")?;
            let y = self.number("hostile y")?;
            let health = self.number("hostile health")?;
            hostiles.push(Hostile {
                id,
                health,
                pos: Point::new(x, y),
            });
        }

        Ok(Some(World::new(Point::new(ax, ay), targets, hostiles)))
    }

    fn number<T: FromStr>(&mut self, context: &'static str) -> Result<T> {
        let token = self
            .next_token()?
            .ok_or(VigilError::UnexpectedEof(context))?;
        parse_token(context, &token)
    }

    fn count(&mut self, context: &'static str) -> Result<usize> {
        let count: i64 = self.number(context)?;
        usize::try_from(count).map_err(|_| VigilError::NegativeCount { context, count })
    }

    fn next_token(&mut self) -> Result<Option<String>> {
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_owned));
        }
        Ok(self.pending.pop_front())
    }
}

fn parse_token<T: FromStr>(context: &'static str, token: &str) -> Result<T> {
    token.parse().map_err(|_| VigilError::InvalidNumber {
        context,
        token: token.to_owned(),
    })
}
