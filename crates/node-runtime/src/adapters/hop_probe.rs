use kt_02_workload_driver::HopProbe;
use kt_03_hop_counter::SharedHopTable;
use shared_types::ContentKey;

/// Lets the discovery loop read the instrumentor's table.
#[derive(Debug, Clone)]
pub struct HopTableProbe {
    table: SharedHopTable,
}

impl HopTableProbe {
    #[must_use]
    pub fn new(table: SharedHopTable) -> Self {
        Self { table }
    }
}

impl HopProbe for HopTableProbe {
    fn begin_query(&self, key: &ContentKey) {
        self.table.begin_query(key);
    }

    fn provider_hops(&self, key: &ContentKey) -> Option<u32> {
        self.table.provider_hops(key)
    }
}
