//! Sample sidecar documents for each product family.
//!
//! Coordinates and values are realistic but small; every document is valid
//! for the product it names unless stated otherwise.

use serde_json::{json, Value};

/// Multispectral bands of a Landsat Open Data Cube scene.
pub const LANDSAT_MS_BANDS: &[&str] = &["blue", "green", "red", "nir", "swir1", "swir2"];

/// Landsat 7 style QA layers; Landsat 8 templates reach them through fallbacks.
pub const LANDSAT_QA_BANDS: &[&str] = &["atmos_opacity", "cloud_qa", "pixel_qa", "radsat_qa"];

/// Open Data Cube sidecar listing `bands`, each stored as `<NAME>.tif`.
///
/// `extra` is appended verbatim as further top-level keys.
pub fn odc_scene_yaml(bands: &[&str], extra: &str) -> String {
    let mut yaml = String::from(
        "id: 4f3c2b1a-sceneA\n\
         product_type: ls8_usgs_sr_scene\n\
         platform: {code: LANDSAT_8}\n\
         instrument: {name: OLI_TIRS}\n\
         extent:\n  center_dt: '2019-03-04T23:51:20.5Z'\n\
         grid_spatial:\n  projection:\n    spatial_reference: EPSG:32655\n\
         \x20   geo_ref_points:\n\
         \x20     ll: {x: 499980.0, y: 5890200.0}\n\
         \x20     lr: {x: 609780.0, y: 5890200.0}\n\
         \x20     ul: {x: 499980.0, y: 6000000.0}\n\
         \x20     ur: {x: 609780.0, y: 6000000.0}\n\
         \x20   valid_data:\n\
         \x20     coordinates:\n\
         \x20       - [[499980.0, 5890200.0], [609780.0, 5890200.0], [609780.0, 6000000.0], [499980.0, 6000000.0], [499980.0, 5890200.0]]\n",
    );
    yaml.push_str("image:\n  bands:\n");
    for band in bands {
        yaml.push_str(&format!("    {}: {{path: {}.tif}}\n", band, band.to_uppercase()));
    }
    yaml.push_str(extra);
    yaml
}

/// Landsat scene carrying every band the four Landsat templates need.
pub fn landsat_scene_yaml() -> String {
    let bands: Vec<&str> = LANDSAT_MS_BANDS.iter().chain(LANDSAT_QA_BANDS).copied().collect();
    odc_scene_yaml(&bands, "")
}

/// SuperView-1 multispectral sidecar at processing level `level`.
pub fn superview_xml(level: &str, bands: u32) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ProductMetaData>
  <SatelliteID>SV1-01</SatelliteID>
  <SensorID>{sensor}</SensorID>
  <ProductLevel>{level}</ProductLevel>
  <ScenePath>214</ScenePath>
  <SceneRow>117</SceneRow>
  <CenterTime>2019-06-12 02:41:37.58</CenterTime>
  <CenterLatitude>30.55</CenterLatitude>
  <CenterLongitude>114.30</CenterLongitude>
  <TopLeftLatitude>30.62</TopLeftLatitude>
  <TopLeftLongitude>114.21</TopLeftLongitude>
  <TopRightLatitude>30.62</TopRightLatitude>
  <TopRightLongitude>114.39</TopRightLongitude>
  <BottomRightLatitude>30.48</BottomRightLatitude>
  <BottomRightLongitude>114.39</BottomRightLongitude>
  <BottomLeftLatitude>30.48</BottomLeftLatitude>
  <BottomLeftLongitude>114.21</BottomLeftLongitude>
  <TopLeftMapX>223500.0</TopLeftMapX>
  <TopLeftMapY>3391200.0</TopLeftMapY>
  <BottomRightMapX>241500.0</BottomRightMapX>
  <BottomRightMapY>3375600.0</BottomRightMapY>
  <Bands>{bands}</Bands>
  <WidthInPixels>4500</WidthInPixels>
  <HeightInPixels>3900</HeightInPixels>
  <PixelBits>16</PixelBits>
  <Gain>{gain}</Gain>
  <Offset>{offset}</Offset>
  <SolarZenith>22.5</SolarZenith>
  <SolarAzimuth>118.3</SolarAzimuth>
  <SatelliteZenith>12.0</SatelliteZenith>
  <SatelliteAzimuth>101.7</SatelliteAzimuth>
  <PitchSatelliteAngle>3.0</PitchSatelliteAngle>
  <RollSatelliteAngle>-4.0</RollSatelliteAngle>
  <CloudPercent>3</CloudPercent>
</ProductMetaData>
"#,
        sensor = if bands == 1 { "PAN" } else { "MUX" },
        level = level,
        bands = bands,
        gain = vec!["0.0821"; bands as usize].join(","),
        offset = vec!["0.0"; bands as usize].join(","),
    )
}

/// DIMAP sidecar for a SuperView-1 scene stored in `data_file`.
pub fn superview_dim(data_file: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Dimap_Document>
  <Coordinate_Reference_System>
    <PROJECTION>EPSG:32650</PROJECTION>
  </Coordinate_Reference_System>
  <Production>
    <PRODUCT_TYPE>LEVEL2A</PRODUCT_TYPE>
  </Production>
  <Data_Access>
    <Data_File>
      <DATA_FILE_PATH href="{data_file}"/>
    </Data_File>
  </Data_Access>
  <Dataset_Frame>
    <Vertex><FRAME_LON>114.21</FRAME_LON><FRAME_LAT>30.62</FRAME_LAT></Vertex>
    <Vertex><FRAME_LON>114.39</FRAME_LON><FRAME_LAT>30.62</FRAME_LAT></Vertex>
    <Vertex><FRAME_LON>114.39</FRAME_LON><FRAME_LAT>30.48</FRAME_LAT></Vertex>
    <Vertex><FRAME_LON>114.21</FRAME_LON><FRAME_LAT>30.48</FRAME_LAT></Vertex>
  </Dataset_Frame>
  <Raster_Dimensions>
    <NCOLS>4500</NCOLS>
    <NROWS>3900</NROWS>
    <NBANDS>4</NBANDS>
  </Raster_Dimensions>
  <Raster_Encoding>
    <NBITS>8</NBITS>
  </Raster_Encoding>
  <Image_Interpretation>
    <Spectral_Band_Info>
      <BAND_INDEX>1</BAND_INDEX>
      <BAND_DESCRIPTION>NIR</BAND_DESCRIPTION>
      <PHYSICAL_GAIN>0.0821</PHYSICAL_GAIN>
      <PHYSICAL_BIAS>0.0</PHYSICAL_BIAS>
      <PHYSICAL_UNIT>W/m2/sr/um</PHYSICAL_UNIT>
    </Spectral_Band_Info>
    <Spectral_Band_Info>
      <BAND_INDEX>2</BAND_INDEX>
      <BAND_DESCRIPTION>RED</BAND_DESCRIPTION>
    </Spectral_Band_Info>
  </Image_Interpretation>
  <Image_Display>
    <Band_Display_Order><RED_CHANNEL>2</RED_CHANNEL></Band_Display_Order>
    <Special_Value><SPECIAL_VALUE_TEXT>NODATA</SPECIAL_VALUE_TEXT></Special_Value>
    <Band_Statistics>
      <BAND_INDEX>1</BAND_INDEX>
      <STX_STDV>12.5</STX_STDV>
      <STX_MEAN>80.25</STX_MEAN>
      <STX_MIN>1</STX_MIN>
      <STX_MAX>255</STX_MAX>
    </Band_Statistics>
  </Image_Display>
  <Dataset_Sources>
    <Scene_Source>
      <MISSION>SUPERVIEW</MISSION>
    </Scene_Source>
    <Source_Information>
      <Scene_Source>
        <MISSION>SUPERVIEW</MISSION>
        <INSTRUMENT>MUX</INSTRUMENT>
        <SUN_ELEVATION>65.2</SUN_ELEVATION>
        <SUN_AZIMUTH>118.3</SUN_AZIMUTH>
        <VIEWING_ANGLE>7.4</VIEWING_ANGLE>
        <EARTH_SUN_DISTANCE>1.0157</EARTH_SUN_DISTANCE>
        <STOP_TIME>2019-06-12T02:41:40.1</STOP_TIME>
      </Scene_Source>
      <Quality_Assessment>
        <Quality_Parameter>
          <QUALITY_PARAMETER_CODE>SNR</QUALITY_PARAMETER_CODE>
          <QUALITY_PARAMETER_DESC>signal to noise</QUALITY_PARAMETER_DESC>
          <QUALITY_PARAMETER_VALUE>120</QUALITY_PARAMETER_VALUE>
        </Quality_Parameter>
        <Quality_Parameter>
          <QUALITY_PARAMETER_CODE>CLOUD_COVER_PERCENTAGE</QUALITY_PARAMETER_CODE>
          <QUALITY_PARAMETER_DESC>cloud cover</QUALITY_PARAMETER_DESC>
          <QUALITY_PARAMETER_VALUE>4.5</QUALITY_PARAMETER_VALUE>
        </Quality_Parameter>
      </Quality_Assessment>
    </Source_Information>
  </Dataset_Sources>
</Dimap_Document>
"#,
        data_file = data_file
    )
}

/// RPC camera model with a height offset of `height_offset`.
pub fn rpb_text(height_offset: f64) -> String {
    let terms = |scale: f64| {
        (0..20)
            .map(|i| format!("{:e}", scale * (i + 1) as f64))
            .collect::<Vec<_>>()
            .join(",\n\t\t")
    };
    format!(
        "satId = \"SV1-01\";\n\
         bandId = \"MS\";\n\
         SpecId = \"RPC00B\";\n\
         BEGIN_GROUP = IMAGE\n\
         \terrBias = 1.0;\n\
         \terrRand = 0.5;\n\
         \tlineOffset = 1950;\n\
         \tsampOffset = 2250;\n\
         \tlatOffset = 30.55;\n\
         \tlongOffset = 114.30;\n\
         \theightOffset = {height_offset};\n\
         \tlineScale = 1950;\n\
         \tsampScale = 2250;\n\
         \tlatScale = 0.07;\n\
         \tlongScale = 0.09;\n\
         \theightScale = 500;\n\
         \tlineNumCoef = (\n\t\t{a});\n\
         \tlineDenCoef = (\n\t\t{b});\n\
         \tsampNumCoef = (\n\t\t{c});\n\
         \tsampDenCoef = (\n\t\t{d});\n\
         END_GROUP = IMAGE\n\
         END;\n",
        height_offset = height_offset,
        a = terms(0.001),
        b = terms(0.002),
        c = terms(0.003),
        d = terms(0.004),
    )
}

/// STAC item whose `B1`..`B10` assets live next to `base_url` and whose
/// `B11` is only reachable through a link.
pub fn stac_item(id: &str, base_url: &str) -> Value {
    let mut assets = serde_json::Map::new();
    for n in 1..=10 {
        assets.insert(
            format!("B{}", n),
            json!({ "href": format!("{}/{}_B{}.TIF", base_url, id, n), "type": "image/tiff" }),
        );
    }
    json!({
        "type": "Feature",
        "stac_version": "1.0.0",
        "id": id,
        "bbox": [149.0, -36.0, 151.5, -34.0],
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[149.0, -36.0], [151.5, -36.0], [151.5, -34.0], [149.0, -34.0], [149.0, -36.0]]]
        },
        "properties": {
            "datetime": "2020-08-01T23:53:12.045Z",
            "platform": "landsat-8",
            "instruments": ["oli", "tirs"],
            "eo:cloud_cover": 12.34,
            "view:off_nadir": 0,
            "view:sun_elevation": 31.2,
            "view:sun_azimuth": 41.7,
            "proj:epsg": 32655
        },
        "assets": assets,
        "links": [
            { "rel": "self", "href": format!("{}/{}.json", base_url, id) },
            { "rel": "B11", "href": format!("{}/{}_B11.TIF", base_url, id) }
        ]
    })
}

/// A search response wrapping `features`.
pub fn feature_collection(features: Vec<Value>) -> Value {
    json!({ "type": "FeatureCollection", "features": features })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landsat_scene_lists_all_bands() {
        let yaml = landsat_scene_yaml();
        for band in LANDSAT_MS_BANDS.iter().chain(LANDSAT_QA_BANDS) {
            assert!(yaml.contains(&format!("    {}: {{path:", band)), "missing {}", band);
        }
    }

    #[test]
    fn test_superview_gain_matches_bands() {
        let xml = superview_xml("LEVEL1B", 4);
        assert!(xml.contains("<Gain>0.0821,0.0821,0.0821,0.0821</Gain>"));
        assert!(superview_xml("LEVEL1B", 1).contains("<SensorID>PAN</SensorID>"));
    }

    #[test]
    fn test_rpb_term_lists() {
        let text = rpb_text(35.0);
        assert!(text.contains("heightOffset = 35;"));
        let first = text.split("lineNumCoef = (").nth(1).unwrap();
        let list = first.split(')').next().unwrap();
        assert_eq!(list.split(',').count(), 20);
    }
}
