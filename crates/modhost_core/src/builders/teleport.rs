//! Player teleport requests.

use super::BuilderError;
use std::time::Duration;

pub const DEFAULT_DIMENSION: &str = "minecraft:overworld";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facing {
    pub yaw: f32,
    pub pitch: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeleportRequest {
    pub player: String,
    pub destination: Position,
    pub dimension: String,
    pub facing: Option<Facing>,
    /// Warmup before the move happens.
    pub delay: Duration,
}

pub trait TeleportRequestBuilder: Send {
    fn player(self: Box<Self>, player: &str) -> Box<dyn TeleportRequestBuilder>;
    fn destination(self: Box<Self>, position: Position) -> Box<dyn TeleportRequestBuilder>;
    fn dimension(self: Box<Self>, dimension: &str) -> Box<dyn TeleportRequestBuilder>;
    fn facing(self: Box<Self>, yaw: f32, pitch: f32) -> Box<dyn TeleportRequestBuilder>;
    fn delay(self: Box<Self>, delay: Duration) -> Box<dyn TeleportRequestBuilder>;
    fn build(self: Box<Self>) -> Result<TeleportRequest, BuilderError>;
}

#[derive(Debug, Default)]
pub struct DefaultTeleportRequestBuilder {
    player: Option<String>,
    destination: Option<Position>,
    dimension: Option<String>,
    facing: Option<Facing>,
    delay: Duration,
}

impl DefaultTeleportRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TeleportRequestBuilder for DefaultTeleportRequestBuilder {
    fn player(mut self: Box<Self>, player: &str) -> Box<dyn TeleportRequestBuilder> {
        self.player = Some(player.trim().to_string());
        self
    }

    fn destination(mut self: Box<Self>, position: Position) -> Box<dyn TeleportRequestBuilder> {
        self.destination = Some(position);
        self
    }

    fn dimension(mut self: Box<Self>, dimension: &str) -> Box<dyn TeleportRequestBuilder> {
        self.dimension = Some(dimension.trim().to_string());
        self
    }

    fn facing(mut self: Box<Self>, yaw: f32, pitch: f32) -> Box<dyn TeleportRequestBuilder> {
        self.facing = Some(Facing { yaw, pitch });
        self
    }

    fn delay(mut self: Box<Self>, delay: Duration) -> Box<dyn TeleportRequestBuilder> {
        self.delay = delay;
        self
    }

    fn build(self: Box<Self>) -> Result<TeleportRequest, BuilderError> {
        let player = self
            .player
            .filter(|value| !value.is_empty())
            .ok_or(BuilderError::MissingField("player"))?;
        let destination = self
            .destination
            .ok_or(BuilderError::MissingField("destination"))?;
        let finite = [destination.x, destination.y, destination.z]
            .iter()
            .all(|value| value.is_finite());
        if !finite {
            return Err(BuilderError::Invalid {
                field: "destination",
                reason: "coordinates must be finite".to_string(),
            });
        }
        if let Some(Facing { pitch, .. }) = self.facing {
            if !(-90.0..=90.0).contains(&pitch) {
                return Err(BuilderError::Invalid {
                    field: "facing",
                    reason: format!("pitch {pitch} is outside -90..=90"),
                });
            }
        }

        Ok(TeleportRequest {
            player,
            destination,
            dimension: self
                .dimension
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_DIMENSION.to_string()),
            facing: self.facing,
            delay: self.delay,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DefaultTeleportRequestBuilder, Position, TeleportRequestBuilder, DEFAULT_DIMENSION};
    use crate::builders::BuilderError;
    use std::time::Duration;

    #[test]
    fn builds_request_with_defaults() {
        let request = Box::new(DefaultTeleportRequestBuilder::new())
            .player("alex")
            .destination(Position::new(10.5, 64.0, -3.0))
            .delay(Duration::from_secs(3))
            .build()
            .expect("valid request");

        assert_eq!(request.player, "alex");
        assert_eq!(request.dimension, DEFAULT_DIMENSION);
        assert_eq!(request.delay, Duration::from_secs(3));
        assert!(request.facing.is_none());
    }

    #[test]
    fn requires_player_and_destination() {
        let err = Box::new(DefaultTeleportRequestBuilder::new())
            .destination(Position::new(0.0, 0.0, 0.0))
            .build()
            .expect_err("player missing");
        assert_eq!(err, BuilderError::MissingField("player"));

        let err = Box::new(DefaultTeleportRequestBuilder::new())
            .player("alex")
            .build()
            .expect_err("destination missing");
        assert_eq!(err, BuilderError::MissingField("destination"));
    }

    #[test]
    fn rejects_out_of_range_pitch() {
        let err = Box::new(DefaultTeleportRequestBuilder::new())
            .player("alex")
            .destination(Position::new(0.0, 70.0, 0.0))
            .facing(0.0, 120.0)
            .build()
            .expect_err("pitch too steep");
        assert!(matches!(err, BuilderError::Invalid { field: "facing", .. }));
    }
}
