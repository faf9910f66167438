//! Turn resolution: one player action followed by a full enemy phase.

use crystal_delve_core::{
    Action, Coord, Direction, EnemyId, Event, GameStatus, ItemKind, Tile, CRYSTAL_SCORE_BONUS,
    PLAYER_ATTACK_DAMAGE, STEP_SCORE, STRIKE_SCORE,
};
use crystal_delve_system_chase::chase_step;

use crate::World;

/// Message shown when the player walks into a wall.
pub const BLOCKED_MESSAGE: &str = "A wall blocks your path.";

/// Message shown when the player rests for a turn.
pub const REST_MESSAGE: &str = "You catch your breath.";

/// Message shown when a heart restores hit points.
pub const HEAL_MESSAGE: &str = "You feel reinvigorated.";

/// Message shown when a heart is picked up at full health.
pub const FULL_HEALTH_MESSAGE: &str = "You are already at full health.";

/// Message shown once the player's hit points run out.
pub const DEFEAT_MESSAGE: &str = "You were defeated in the dark.";

const CRYSTAL_MESSAGE: &str = "You pocket a shimmering crystal!";

impl World {
    pub(crate) fn act(&mut self, action: Action, out_events: &mut Vec<Event>) {
        if self.status != GameStatus::Playing {
            log::debug!("ignoring {action:?} while {:?}", self.status);
            return;
        }

        match action {
            Action::Move(direction) => self.move_player(direction, out_events),
            Action::Wait => {
                self.message = REST_MESSAGE.to_owned();
                out_events.push(Event::PlayerRested);
                self.enemy_turn(out_events);
            }
        }

        log::debug!(
            "resolved {action:?}: player {:?} hp {} score {}, {} enemies, status {:?}",
            self.player.cell,
            self.player.hp,
            self.player.score,
            self.enemies.len(),
            self.status
        );
    }

    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let from = self.player.cell;
        let Some(target) = from.step(direction) else {
            return;
        };
        if !self.grid.contains(target) {
            return;
        }

        if self.grid.tile(target) == Some(Tile::Wall) {
            self.message = BLOCKED_MESSAGE.to_owned();
            out_events.push(Event::MoveBlocked { target });
            return;
        }

        if let Some(index) = self.enemy_index_at(target) {
            self.attack(index, out_events);
            self.enemy_turn(out_events);
            return;
        }

        self.player.cell = target;
        self.player.score += STEP_SCORE;
        out_events.push(Event::PlayerMoved { from, to: target });

        self.collect_item(target, out_events);

        if target == self.exit {
            self.status = GameStatus::Won;
            self.message = format!("You escape with {} crystals!", self.player.crystals);
            out_events.push(Event::StatusChanged {
                status: GameStatus::Won,
            });
        }

        self.refresh_visibility(out_events);
        if self.status == GameStatus::Playing {
            self.enemy_turn(out_events);
        }
    }

    fn collect_item(&mut self, cell: Coord, out_events: &mut Vec<Event>) {
        let Some(item) = self.items.remove(&cell) else {
            self.message.clear();
            return;
        };

        let gained = match item.kind {
            ItemKind::Crystal => {
                self.player.crystals += item.value;
                self.player.score += CRYSTAL_SCORE_BONUS;
                self.message = CRYSTAL_MESSAGE.to_owned();
                item.value
            }
            ItemKind::Heart => {
                let healed = (self.player.max_hp - self.player.hp).min(item.value).max(0);
                self.player.hp += healed;
                self.message = if healed > 0 {
                    HEAL_MESSAGE
                } else {
                    FULL_HEALTH_MESSAGE
                }
                .to_owned();
                healed
            }
        };

        out_events.push(Event::ItemCollected {
            cell,
            kind: item.kind,
            gained,
        });
    }

    fn attack(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let enemy = &mut self.enemies[index];
        enemy.hp -= PLAYER_ATTACK_DAMAGE;
        self.player.score += STRIKE_SCORE;

        if enemy.hp > 0 {
            self.message = format!("You strike the {}!", enemy.noun());
            out_events.push(Event::EnemyStruck {
                enemy: enemy.id,
                remaining_hp: enemy.hp,
            });
            return;
        }

        let fallen = self.enemies.remove(index);
        self.message = format!("The {} falls!", fallen.noun());
        out_events.push(Event::EnemyDefeated {
            enemy: fallen.id,
            species: fallen.species,
        });
    }

    fn enemy_turn(&mut self, out_events: &mut Vec<Event>) {
        let roster: Vec<EnemyId> = self.enemies.iter().map(|enemy| enemy.id).collect();

        for id in roster {
            let Some(index) = self.enemy_index(id) else {
                continue;
            };
            let enemy = self.enemies[index];

            if enemy.cell.manhattan_distance(self.player.cell) == 1 {
                self.player.hp -= enemy.damage;
                self.message = format!("The {} hits you!", enemy.noun());
                out_events.push(Event::PlayerHit {
                    enemy: enemy.id,
                    damage: enemy.damage,
                    remaining_hp: self.player.hp,
                });
                log::trace!("{:?} hits for {}", enemy.id, enemy.damage);

                if self.player.hp <= 0 {
                    self.message = DEFEAT_MESSAGE.to_owned();
                    if self.status != GameStatus::Lost {
                        self.status = GameStatus::Lost;
                        out_events.push(Event::StatusChanged {
                            status: GameStatus::Lost,
                        });
                    }
                }
                continue;
            }

            let step = chase_step(enemy.cell, self.player.cell, |cell| {
                self.grid.is_walkable(cell) && self.enemy_index_at(cell).is_none()
            });
            let Some(to) = step else {
                log::trace!("{:?} holds at {:?}", enemy.id, enemy.cell);
                continue;
            };

            self.enemies[index].cell = to;
            out_events.push(Event::EnemyAdvanced {
                enemy: enemy.id,
                from: enemy.cell,
                to,
            });
            log::trace!("{:?} advances {:?} -> {:?}", enemy.id, enemy.cell, to);
        }

        self.refresh_visibility(out_events);
    }
}
