use crate::drawing::LatLng;

/// A fixed site on the map. Marker ids are 1-based positions in [`BUILTIN_MARKERS`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuiltinMarker {
    pub position: LatLng,
    pub image: &'static str,
}

const fn site(lat: f64, lng: f64, image: &'static str) -> BuiltinMarker {
    BuiltinMarker {
        position: LatLng::new(lat, lng),
        image,
    }
}

pub const BUILTIN_MARKERS: [BuiltinMarker; 13] = [
    site(7.083483615107523, 125.62724728562387, "https://picsum.photos/id/1015/800/560"),
    site(7.0837635750295025, 125.62749048383216, "https://picsum.photos/id/1016/800/560"),
    site(7.083870160887393, 125.62754624549838, "https://picsum.photos/id/1018/800/560"),
    site(7.08391344844686, 125.62758628119416, "https://picsum.photos/id/1020/800/560"),
    site(7.084145057569356, 125.62779091136315, "https://picsum.photos/id/1024/800/560"),
    site(7.084190664953738, 125.62783308144925, "https://picsum.photos/id/1025/800/560"),
    site(7.084248025387979, 125.62787345516176, "https://picsum.photos/id/1027/800/560"),
    site(7.084330032613001, 125.62795374569423, "https://picsum.photos/id/1031/800/560"),
    site(7.084407392795819, 125.62803000646079, "https://picsum.photos/id/1033/800/560"),
    site(7.084504708741913, 125.62811858329982, "https://picsum.photos/id/1035/800/560"),
    site(7.084611963979416, 125.62825136355237, "https://picsum.photos/id/1036/800/560"),
    site(7.084673774348007, 125.62828946432103, "https://picsum.photos/id/1038/800/560"),
    site(7.084852571172857, 125.62841246788105, "https://picsum.photos/id/1040/800/560"),
];

/// Look up a built-in marker by its 1-based id.
pub fn builtin_marker(id: u32) -> Option<&'static BuiltinMarker> {
    let index = usize::try_from(id).ok()?.checked_sub(1)?;
    BUILTIN_MARKERS.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_one_based() {
        assert!(builtin_marker(0).is_none());
        assert_eq!(builtin_marker(1).unwrap().image, "https://picsum.photos/id/1015/800/560");
        assert_eq!(builtin_marker(13).unwrap().image, "https://picsum.photos/id/1040/800/560");
        assert!(builtin_marker(14).is_none());
    }

    #[test]
    fn test_sites_are_close_together() {
        let first = BUILTIN_MARKERS[0].position;
        for marker in &BUILTIN_MARKERS {
            assert!(crate::drawing::distance_meters(first, marker.position) < 300.0);
        }
    }
}
