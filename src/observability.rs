// ── Mutation metrics ────────────────────────────────────────────

/// Counter: successful mutations. Labels: entity, op.
pub const MUTATIONS_TOTAL: &str = "roombook_mutations_total";

/// Counter: reservation adds/edits turned away. Labels: reason.
pub const RESERVATIONS_REJECTED_TOTAL: &str = "roombook_reservations_rejected_total";

// ── Persistence metrics ─────────────────────────────────────────

/// Histogram: whole-file rewrite duration in seconds.
pub const PERSIST_DURATION_SECONDS: &str = "roombook_persist_duration_seconds";

/// Counter: parent-ID back-references corrected by the repair pass.
pub const IDS_REPAIRED_TOTAL: &str = "roombook_ids_repaired_total";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Building,
    Room,
    Reservation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Edit,
    Remove,
}

/// Map an entity to a short label for metrics.
pub fn entity_label(entity: Entity) -> &'static str {
    match entity {
        Entity::Building => "building",
        Entity::Room => "room",
        Entity::Reservation => "reservation",
    }
}

/// Map an operation to a short label for metrics.
pub fn op_label(op: Op) -> &'static str {
    match op {
        Op::Add => "add",
        Op::Edit => "edit",
        Op::Remove => "remove",
    }
}

pub(crate) fn record_mutation(entity: Entity, op: Op) {
    metrics::counter!(MUTATIONS_TOTAL, "entity" => entity_label(entity), "op" => op_label(op))
        .increment(1);
}
