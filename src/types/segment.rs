//! Customer segment descriptions keyed by cluster id

use serde::Serialize;

/// Hand-authored business text for one customer segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClusterInfo {
    /// Short customer type label
    pub type_label: &'static str,
    pub description: &'static str,
    /// Offers in display order
    pub offers: &'static [&'static str],
    pub recommendation: &'static str,
}

impl ClusterInfo {
    /// Look up a cluster id in [`CUSTOMER_SEGMENTS`]
    pub fn lookup(cluster_id: usize) -> Option<&'static ClusterInfo> {
        CUSTOMER_SEGMENTS.get(cluster_id)
    }

    /// Number of cluster ids the table describes
    pub fn count() -> usize {
        CUSTOMER_SEGMENTS.len()
    }
}

/// Segment table, indexed by cluster id
pub static CUSTOMER_SEGMENTS: [ClusterInfo; 3] = [
    ClusterInfo {
        type_label: "Budget-Conscious Shopper",
        description: "Moderate income and modest spending. Buys mainly in store, \
                      compares prices and responds to discounts more than to brand.",
        offers: &[
            "10% discount coupon on the next store purchase",
            "Buy-one-get-one deals on everyday essentials",
            "Double loyalty points on weekday visits",
        ],
        recommendation: "Lead with price: bundle essentials into value packs and send \
                         seasonal discount campaigns. Keep communication short and \
                         coupon-driven.",
    },
    ClusterInfo {
        type_label: "Premium Loyal Customer",
        description: "High income and the highest spending across channels. Long \
                      relationship with the store, purchases frequently and recently.",
        offers: &[
            "Early access to new collections",
            "Complimentary premium membership tier",
            "Personal shopping assistant on request",
        ],
        recommendation: "Protect and grow the relationship: reward loyalty with \
                         exclusive experiences rather than discounts, and cross-sell \
                         premium product lines.",
    },
    ClusterInfo {
        type_label: "Family-Focused Online Browser",
        description: "Household with children. Visits the website often but converts \
                      less; spending is spread over many small purchases.",
        offers: &[
            "Free delivery on online orders above a low threshold",
            "Family-size multipack pricing",
            "Back-to-school and kids' product promotions",
        ],
        recommendation: "Convert browsing into buying: retarget web visitors with \
                         family bundles, simplify checkout and highlight delivery \
                         convenience.",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_ids() {
        for id in 0..ClusterInfo::count() {
            let info = ClusterInfo::lookup(id).unwrap();
            assert!(!info.type_label.is_empty());
            assert!(!info.offers.is_empty());
        }
        assert_eq!(
            ClusterInfo::lookup(1).unwrap().type_label,
            "Premium Loyal Customer"
        );
    }

    #[test]
    fn test_lookup_unknown_id() {
        assert!(ClusterInfo::lookup(3).is_none());
        assert!(ClusterInfo::lookup(usize::MAX).is_none());
    }
}
