//! Shared test helpers.

use std::fs;
use std::path::Path;

/// A small WotLK-style data set:
///   - model 10 (rat) used by displays 100 and 101, model 11 (wolf) by 110
///   - display 120 has a model with no path, display 130 no template
///   - template 5001 has two skins, 5003 points at a missing display
#[allow(dead_code)]
pub fn write_data_fixture(dir: &Path) {
    fs::write(
        dir.join("CreatureModelData.csv"),
        "ID,ModelName,SizeClass\n\
         10,\"Creature\\Rat\\Rat.mdx\",1\n\
         11,\"Creature\\Wolf\\Wolf.mdx\",1\n\
         12,,0\n\
         13,\"Creature\\Bear\\Bear.mdx\",2\n",
    )
    .unwrap();
    fs::write(
        dir.join("CreatureDisplayInfo.csv"),
        "ID,ModelID,TextureVariation_0,TextureVariation_1,TextureVariation_2\n\
         100,10,RatSkin,,\n\
         101,10,RatSkinBrown,,\n\
         110,11,WolfGrey,\"Wolf \"\"Fur\"\"\",\n\
         120,12,Orphan,,\n\
         130,13,,,\n",
    )
    .unwrap();
    fs::write(
        dir.join("creature_template.csv"),
        "entry,name,modelid1,modelid2,modelid3,modelid4\n\
         5000,Rat,100,0,0,0\n\
         5001,Rat Pack,100,101,0,0\n\
         5002,Wolf,110,0,0,0\n\
         5003,Broken,999,0,0,0\n\
         5004,Nothing,0,0,0,0\n",
    )
    .unwrap();
}

/// Create an empty file, making parent directories.
#[allow(dead_code)]
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"MD20").unwrap();
}
