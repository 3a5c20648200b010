use fxhash::FxHashMap;

use crate::model::{NetworkSegment, Room, RoomId, Structure, StructureId};

/// An indoor segment together with the floor it was drawn on.
#[derive(Clone, Debug)]
pub struct FloorSegment {
    pub floor: i32,
    pub segment: NetworkSegment,
}

/// Read-only access to the persisted campus data. The engine treats the
/// store as an immutable snapshot for the duration of one query; mutation
/// lives entirely outside this crate.
pub trait CampusStore {
    fn structure(&self, id: StructureId) -> Option<Structure>;
    fn room(&self, id: RoomId) -> Option<Room>;
    fn rooms_on_floors(&self, structure: StructureId, floors: &[i32]) -> Vec<Room>;
    /// All indoor segments of a structure, across every floor.
    fn indoor_segments(&self, structure: StructureId) -> Vec<FloorSegment>;
    fn indoor_segments_on_floor(&self, structure: StructureId, floor: i32) -> Vec<NetworkSegment>;
    fn outdoor_segments(&self) -> Vec<NetworkSegment>;
}

/// In-memory store: the whole campus loaded up front. Backs the API
/// service and the test fixtures.
#[derive(Default)]
pub struct MemoryStore {
    structures: FxHashMap<StructureId, Structure>,
    rooms: FxHashMap<RoomId, Room>,
    indoor: FxHashMap<StructureId, Vec<FloorSegment>>,
    outdoor: Vec<NetworkSegment>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn add_structure(&mut self, structure: Structure) {
        self.structures.insert(structure.id, structure);
    }

    pub fn add_room(&mut self, room: Room) {
        self.rooms.insert(room.id, room);
    }

    pub fn add_indoor_segment(
        &mut self,
        structure: StructureId,
        floor: i32,
        segment: NetworkSegment,
    ) {
        self.indoor
            .entry(structure)
            .or_default()
            .push(FloorSegment { floor, segment });
    }

    pub fn add_outdoor_segment(&mut self, segment: NetworkSegment) {
        self.outdoor.push(segment);
    }

    pub fn indoor_count(&self) -> usize {
        self.indoor.values().map(Vec::len).sum()
    }

    pub fn outdoor_count(&self) -> usize {
        self.outdoor.len()
    }
}

impl CampusStore for MemoryStore {
    fn structure(&self, id: StructureId) -> Option<Structure> {
        self.structures.get(&id).cloned()
    }

    fn room(&self, id: RoomId) -> Option<Room> {
        self.rooms.get(&id).cloned()
    }

    fn rooms_on_floors(&self, structure: StructureId, floors: &[i32]) -> Vec<Room> {
        let mut rooms: Vec<Room> = self
            .rooms
            .values()
            .filter(|room| room.structure_id == structure && floors.contains(&room.floor))
            .cloned()
            .collect();
        rooms.sort_by_key(|room| room.id);
        rooms
    }

    fn indoor_segments(&self, structure: StructureId) -> Vec<FloorSegment> {
        self.indoor.get(&structure).cloned().unwrap_or_default()
    }

    fn indoor_segments_on_floor(&self, structure: StructureId, floor: i32) -> Vec<NetworkSegment> {
        self.indoor
            .get(&structure)
            .map(|segments| {
                segments
                    .iter()
                    .filter(|fs| fs.floor == floor)
                    .map(|fs| fs.segment.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn outdoor_segments(&self) -> Vec<NetworkSegment> {
        self.outdoor.clone()
    }
}
