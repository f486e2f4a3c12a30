use crate::domain::model::{AutocompleteFilter, Place, Serviced};

/// Case-insensitive substring search over the place table.
///
/// A place matches the text when its Gpuid, name, StopCluster unique name
/// or one of its SegmentProviderStop names contains the query. The kind
/// filters (`StopGroup`, `StopCluster`) widen each other; every other
/// filter narrows the result.
pub fn search(places: &[Place], query: &str, filters: &[AutocompleteFilter]) -> Vec<Place> {
    let needle = query.trim().to_lowercase();

    let results: Vec<Place> = places
        .iter()
        .filter(|place| matches_text(place, &needle))
        .filter(|place| matches_filters(places, place, filters))
        .cloned()
        .collect();

    tracing::debug!(
        "Autocomplete \"{}\" with {} filters matched {} places",
        query,
        filters.len(),
        results.len()
    );
    results
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn matches_text(place: &Place, needle: &str) -> bool {
    if needle.is_empty() || contains(place.id(), needle) || contains(place.name(), needle) {
        return true;
    }
    match place {
        Place::Cluster(cluster) => cluster
            .unique_name
            .as_deref()
            .is_some_and(|unique_name| contains(unique_name, needle)),
        Place::Group(group) => group.children.iter().any(|stop| contains(&stop.name, needle)),
    }
}

fn matches_filters(places: &[Place], place: &Place, filters: &[AutocompleteFilter]) -> bool {
    let wants_groups = filters.contains(&AutocompleteFilter::StopGroup);
    let wants_clusters = filters.contains(&AutocompleteFilter::StopCluster);
    if wants_groups || wants_clusters {
        let kind_ok = match place {
            Place::Group(_) => wants_groups,
            Place::Cluster(_) => wants_clusters,
        };
        if !kind_ok {
            return false;
        }
    }

    if filters.contains(&AutocompleteFilter::Serviced) && place.serviced() != Some(Serviced::True)
    {
        return false;
    }

    if filters.contains(&AutocompleteFilter::SegmentProviderStop)
        && !reaches_provider_stop(places, place)
    {
        return false;
    }

    true
}

fn reaches_provider_stop(places: &[Place], place: &Place) -> bool {
    match place {
        Place::Group(group) => !group.children.is_empty(),
        Place::Cluster(cluster) => places
            .iter()
            .filter_map(Place::as_group)
            .any(|group| cluster.contains(&group.gpuid) && !group.children.is_empty()),
    }
}
