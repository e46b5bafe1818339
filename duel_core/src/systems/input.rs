use crate::components::{Jet, JetIntent};
use crate::resources::InputQueue;
use hecs::World;

/// Fold queued player inputs into each jet's intent
pub fn ingest_inputs(world: &mut World, inputs: &mut InputQueue) {
    let pending = inputs.pop_inputs();
    if pending.is_empty() {
        return;
    }

    for (_entity, (jet, intent)) in world.query_mut::<(&Jet, &mut JetIntent)>() {
        for (player, input) in &pending {
            if *player != jet.id {
                continue;
            }
            if input.steer {
                intent.steer_taps = intent.steer_taps.saturating_add(1);
            }
            intent.fire |= input.fire;
        }
    }
}
