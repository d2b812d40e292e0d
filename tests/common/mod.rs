//! Shared on-disk fixtures for the integration tests.

#![allow(dead_code)]

use mortality_dashboard::data::{DataLoader, MortalityData, SourcePaths};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const RECORDS_HEADER: &str =
    "AÑO,COD_DANE,COD_DEPARTAMENTO,COD_MUNICIPIO,MES,SEXO,GRUPO_EDAD1,COD_MUERTE,MANERA_MUERTE";

/// Nine deaths: two firearm homicides in Medellín, one in Bogotá, a
/// homicide with a non-firearm code, a firearm accident in Cali and one
/// record whose division and cause are absent from the catalogs.
pub const RECORDS: &str = "\
2019,05001,05,001,1,1,13,X954,Homicidio
2019,05001,05,001,1,1,12,X954,Homicidio
2019,05001,05,001,2,2,21,I219,Natural
2019,05002,05,002,3,2,22,I219,Natural
2019,11001,11,001,3,1,13,X954,Homicidio
2019,11001,11,001,3,2,20,I219,Natural
2019,11001,11,001,4,1,14,X990,Homicidio
2019,76001,76,001,5,1,14,X954,Accidente
2019,99999,99,999,6,9,5,R99X,Natural
";

pub const DIVISIONS: &str = "\
COD_DANE,COD_DEPARTAMENTO,DEPARTAMENTO,COD_MUNICIPIO,MUNICIPIO
05001,05,ANTIOQUIA,001,MEDELLÍN
05002,05,ANTIOQUIA,002,ABEJORRAL
11001,11,\"BOGOTÁ, D.C.\",001,\"BOGOTÁ, D.C.\"
76001,76,VALLE DEL CAUCA,001,CALI
";

pub const CAUSE_CATALOG: &str = "\
Ministerio de Salud
Clasificación Internacional de Enfermedades
CIE-10
Versión 2019
Capítulo
20,Causas externas,X95,Agresión con disparo,X954,\"Agresión con disparo, calle\"
09,Circulatorio,I21,Infarto agudo,I219,Infarto agudo del miocardio
09,Circulatorio,I21,Infarto agudo,I219,Duplicado
";

pub const BOUNDARIES: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"GID_1": "COL.2_1", "NAME_1": "Antioquia"},
     "geometry": {"type": "Polygon", "coordinates": [[[-77.0, 6.0], [-75.0, 6.0], [-75.0, 8.0], [-77.0, 6.0]]]}},
    {"type": "Feature", "properties": {"GID_1": "COL.3_1", "NAME_1": "Bogotá D.C."},
     "geometry": {"type": "MultiPolygon", "coordinates": [[[[-74.2, 4.5], [-74.0, 4.5], [-74.0, 4.8], [-74.2, 4.5]]]]}},
    {"type": "Feature", "properties": {"GID_1": "COL.30_1", "NAME_1": "Valle del Cauca"},
     "geometry": {"type": "Polygon", "coordinates": [[[-77.0, 3.0], [-76.0, 3.0], [-76.0, 4.5], [-77.0, 3.0]]]}}
  ]
}"#;

pub struct Fixture {
    pub dir: TempDir,
    pub paths: SourcePaths,
}

impl Fixture {
    pub fn load(&self) -> MortalityData {
        DataLoader::load(&self.paths).expect("fixture loads")
    }
}

/// Write the default fixture set.
pub fn fixture() -> Fixture {
    fixture_with_records(RECORDS)
}

/// Fixture set with custom record rows under the standard header.
pub fn fixture_with_records(rows: &str) -> Fixture {
    let dir = tempfile::tempdir().expect("temp dir");
    let records = format!("{}\n{}", RECORDS_HEADER, rows);
    write(dir.path(), "NoFetal2019.csv", &records);
    write(dir.path(), "Divipola.csv", DIVISIONS);
    write(dir.path(), "CodigosDeMuerte.csv", CAUSE_CATALOG);
    write(dir.path(), "colombia_departamentos.geojson", BOUNDARIES);
    // CSV exports stand in for the workbooks; the extension picks the reader.
    let paths = SourcePaths {
        records: dir.path().join("NoFetal2019.csv"),
        cause_catalog: dir.path().join("CodigosDeMuerte.csv"),
        divisions: dir.path().join("Divipola.csv"),
        records_sheet: None,
        ..SourcePaths::in_dir(dir.path())
    };
    Fixture { dir, paths }
}

pub fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("write fixture");
}
